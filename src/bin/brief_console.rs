//! Interactive console for the brief agent.
//!
//! Reads briefs from stdin, one per line, and prints each pipeline stage to
//! stdout. Logs go to stderr and the configured log file.

use brief_agent::{config::Config, console, logging, BriefPipeline};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_error = dotenvy::dotenv().err();

    let config = Config::from_env()?;

    logging::init(config.log_file.as_deref(), logging::Echo::Stderr);
    if let Some(e) = dotenv_error {
        tracing::info!("No .env file loaded: {}", e);
    }
    config.log_summary();

    let pipeline = BriefPipeline::from_config(&config);
    console::run(
        &pipeline,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    Ok(())
}
