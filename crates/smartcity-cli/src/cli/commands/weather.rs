//! One-shot weather lookup.

use anyhow::{Context, Result};
use smartcity_core::config::Config;
use smartcity_core::weather::WeatherClient;
use tokio_util::sync::CancellationToken;

pub async fn run(config: &Config) -> Result<()> {
    let client = WeatherClient::from_config(config);
    let temp = client
        .fetch_temperature(&CancellationToken::new())
        .await
        .with_context(|| format!("fetch weather for {}", client.city()))?;
    println!("{}: {}", client.city(), client.unit().format(temp));
    Ok(())
}
