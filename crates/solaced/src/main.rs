//! Solace Daemon - emotion-aware support chat backend
//!
//! Serves the chat API, detects user emotion per turn, and adapts answer
//! tone with per-session frustration tracking.

use anyhow::Result;
use clap::Parser;
use solaced::server::{self, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solaced")]
#[command(about = "Emotion-aware support chat daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = solace_common::CONFIG_PATH)]
    config: String,

    /// Override the listen address from the config
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    info!("Solace Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = solace_common::SolaceConfig::load(std::path::Path::new(&cli.config))?;
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }

    let state = AppState::from_config(config);
    info!("Solace Daemon ready");

    server::run(state).await
}
