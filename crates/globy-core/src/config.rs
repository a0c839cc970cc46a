use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::env;

use crate::error::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn base_url(&self) -> String {
        let url: String = self
            .get("api.base_url")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        url.trim_end_matches('/').to_string()
    }

    pub fn debounce_ms(&self) -> u64 {
        self.get("search.debounce_ms").unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if let Ok(url) = self.get::<String>("api.base_url") {
            validate_base_url(&url)?;
        }
        Ok(())
    }
}

/// The backend is only ever reached over http(s); reject anything else
/// early instead of letting the client fail on the first request.
pub fn validate_base_url(url: &str) -> Result<(), Error> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "api.base_url must be an http(s) URL, got '{}'",
            url
        )))
    }
}
