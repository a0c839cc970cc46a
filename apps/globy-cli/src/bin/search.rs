use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use globy_api::ApiClient;
use globy_controller::{SearchController, SearchState};
use globy_core::config::Config;
use globy_core::session::SessionStore;
use tokio::sync::watch;

/// Interactive photo search against the GLOBY backend
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    let base_url = config.base_url();
    let debounce = Duration::from_millis(config.debounce_ms());

    let session = match config.get::<String>("api_token") {
        Ok(token) => Arc::new(SessionStore::with_token(token)),
        Err(_) => Arc::new(SessionStore::new()),
    };
    let client = ApiClient::new(&base_url, session)?;
    let controller = SearchController::new(Arc::new(client), debounce);

    println!("🔍 GLOBY Photo Search");
    println!("=====================");
    println!("📡 Backend: {}", base_url);
    println!();
    show_help();
    println!();

    let mut rx = controller.state();
    loop {
        print!("search> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        match input {
            "/help" | "/h" => show_help(),
            "/quit" | "/q" | "quit" | "exit" => {
                println!("👋 Goodbye!");
                break;
            }
            _ => {
                controller.on_query_changed(input);
                let state = await_settled(&mut rx, input).await?;
                render(&state);
            }
        }
        println!();
    }

    controller.close();
    Ok(())
}

/// Wait for the debounced lookup to start and then settle. An empty query
/// settles synchronously, so the current state is already final.
async fn await_settled(rx: &mut watch::Receiver<SearchState>, query: &str) -> Result<SearchState> {
    if query.trim().is_empty() {
        return Ok(rx.borrow_and_update().clone());
    }
    loop {
        if rx.borrow_and_update().loading {
            break;
        }
        rx.changed().await?;
    }
    loop {
        {
            let state = rx.borrow_and_update().clone();
            if !state.loading {
                return Ok(state);
            }
        }
        rx.changed().await?;
    }
}

fn render(state: &SearchState) {
    if let Some(err) = &state.error {
        println!("❌ Search error: {}", err);
        return;
    }
    if state.query.trim().is_empty() {
        println!("🧹 Cleared");
        return;
    }
    if state.results.is_empty() {
        println!("🔍 No results found for: \"{}\"", state.query);
        return;
    }

    println!("🔍 Found {} results for: \"{}\"", state.results.len(), state.query);
    println!();
    for (i, item) in state.results.iter().enumerate() {
        println!("  {}. {}", i + 1, item.caption.as_deref().unwrap_or("(no caption)"));
        println!("     url={}", item.image_url);
        if let Some(tags) = &item.tags {
            if !tags.is_empty() {
                println!("     tags={}", tags.join(", "));
            }
        }
        println!();
    }
}

fn show_help() {
    println!("🎯 Commands:");
    println!("  /help, /h   - Show this help message");
    println!("  /quit, /q   - Exit the search");
    println!("  <query>     - Search photos by people, places, objects");
    println!("  (empty)     - Clear the current results");
}
