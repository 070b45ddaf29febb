//! brief-agent - HTTP Server Entry Point
//!
//! Starts the HTTP server that turns briefs into Asana tasks.

use brief_agent::{api, config::Config, logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_error = dotenvy::dotenv().err();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    logging::init(config.log_file.as_deref(), logging::Echo::Stdout);
    if let Some(e) = dotenv_error {
        info!("No .env file loaded: {}", e);
    }
    config.log_summary();

    // Start HTTP server
    info!("Starting server on {}:{}", config.host, config.port);
    api::serve(config).await?;

    Ok(())
}
