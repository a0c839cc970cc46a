use std::sync::Arc;

use anyhow::Result;
use globy_api::ApiClient;
use globy_core::config::Config;
use globy_core::session::SessionStore;

/// Tell the backend a hosted upload finished; prints the generated caption
/// and tags. The file itself is pushed to the upload provider beforehand.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(image_url) = std::env::args().nth(1) else {
        eprintln!("Usage: globy-upload <hosted-image-url>");
        std::process::exit(2);
    };

    let config = Config::load()?;
    let session = match config.get::<String>("api_token") {
        Ok(token) => Arc::new(SessionStore::with_token(token)),
        Err(_) => Arc::new(SessionStore::new()),
    };
    let client = ApiClient::new(&config.base_url(), session)?;

    match client.complete_upload(&image_url).await {
        Ok(outcome) => {
            println!("✅ Upload processed: {}", outcome.image_url);
            if let Some(caption) = &outcome.caption {
                println!("📝 Caption: {}", caption);
            }
            if !outcome.tags.is_empty() {
                println!("🏷  Tags: {}", outcome.tags.join(", "));
            }
            Ok(())
        }
        Err(e) => {
            println!("❌ Upload failed: {}", e);
            std::process::exit(1);
        }
    }
}
