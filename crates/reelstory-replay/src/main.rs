//! Reelstory replay harness entry point.

use std::error::Error;
use std::sync::Arc;

use reelstory_core::clock::SystemClock;
use reelstory_player::config::PlayerConfig;
use reelstory_replay::error::AppError;
use reelstory_replay::ports::{LoggingMessageChannel, LoggingStoryStore};
use reelstory_replay::runner::run_script;
use reelstory_replay::script::Script;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the script path.
const SCRIPT_VAR: &str = "REELSTORY_SCRIPT";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Reelstory replay harness");

    // Read configuration from environment.
    let script_path = std::env::var(SCRIPT_VAR)
        .map_err(|_| AppError::Config(format!("{SCRIPT_VAR} environment variable must be set")))?;
    let config = PlayerConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;

    let script = Script::load(&script_path).await?;
    let outcome = run_script(
        script,
        config,
        Arc::new(SystemClock),
        Arc::new(LoggingMessageChannel),
        Arc::new(LoggingStoryStore),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
