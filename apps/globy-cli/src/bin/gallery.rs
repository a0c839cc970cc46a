use std::sync::Arc;

use anyhow::Result;
use globy_api::ApiClient;
use globy_core::config::Config;
use globy_core::session::SessionStore;

/// Print the full gallery
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    let session = match config.get::<String>("api_token") {
        Ok(token) => Arc::new(SessionStore::with_token(token)),
        Err(_) => Arc::new(SessionStore::new()),
    };
    let client = ApiClient::new(&config.base_url(), session)?;

    let images = client.gallery().await?;
    if images.is_empty() {
        println!("🖼  Gallery is empty");
        return Ok(());
    }

    println!("🖼  Gallery ({} photos)", images.len());
    println!();
    for image in &images {
        println!("  {}. {}", image.id, image.caption);
        println!("     url={}", image.image_url);
    }
    Ok(())
}
