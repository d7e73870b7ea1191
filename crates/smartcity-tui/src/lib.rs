//! Full-screen event map for the smart city client.

pub mod actions;
pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use anyhow::{Context, Result};
pub use features::{map, statusline, weather};
pub use runtime::TuiRuntime;
use smartcity_core::config::Config;
use smartcity_core::persistence::EventSink;

/// Runs the interactive map until the user quits.
pub async fn run_interactive(config: Config) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The map requires a terminal.\n\
             Use `smartcity events list` for non-interactive output."
        );
    }

    let sink = EventSink::from_config(&config.persistence)
        .context("Failed to set up event persistence")?;

    let mut err = stderr();
    writeln!(err, "Smart City: {}", config.city)?;
    writeln!(err, "Persistence: {}", sink.name())?;
    err.flush()?;

    let mut runtime = TuiRuntime::new(config, sink)?;
    runtime.run()?;
    drop(runtime);

    writeln!(stderr(), "Goodbye!")?;

    Ok(())
}
