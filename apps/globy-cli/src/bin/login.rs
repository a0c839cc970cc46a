use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use globy_api::ApiClient;
use globy_core::config::Config;
use globy_core::session::SessionStore;

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// Log in and print the bearer token for the other tools
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    let session = Arc::new(SessionStore::new());
    let client = ApiClient::new(&config.base_url(), Arc::clone(&session))?;

    println!("🔐 GLOBY Login");
    println!("==============");
    let email = prompt("Email")?;
    let password = prompt("Password")?;

    match client.login(&email, &password).await {
        Ok(token) => {
            println!();
            println!("✅ Login successful");
            println!("🔑 Token: {}", token);
            println!();
            // The session store dies with this process, so hand the token over.
            println!("Export it for the other tools:");
            println!("  export APP_API_TOKEN={}", token);
            Ok(())
        }
        Err(e) => {
            println!("❌ Login failed: {}", e);
            std::process::exit(1);
        }
    }
}
