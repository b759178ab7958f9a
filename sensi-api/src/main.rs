//! Sensi API - Main entry point.

use anyhow::Result;
use sensi_common::config::Config;
use sensi_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load and validate configuration (env overrides applied)
    let config = Config::load_and_validate()?;

    init_logging(&config.observability.log_level, &config.observability.log_format);

    tracing::info!("Sensi API v{}", env!("CARGO_PKG_VERSION"));

    sensi_api::start_server(&config).await
}
