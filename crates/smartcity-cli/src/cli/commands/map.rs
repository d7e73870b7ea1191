//! Interactive map command.

use anyhow::Result;
use smartcity_core::config::Config;
use tracing::info;

pub async fn run(config: Config) -> Result<()> {
    info!(city = %config.city, backend = ?config.persistence.backend, "Starting map");
    smartcity_tui::run_interactive(config).await
}
