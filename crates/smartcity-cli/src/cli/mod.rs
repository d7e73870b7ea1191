//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use smartcity_core::config;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "smartcity")]
#[command(version)]
#[command(about = "Smart city event map for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the city shown on the map and used for weather
    #[arg(long, env = "SMARTCITY_CITY")]
    city: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Fetch and print the current temperature
    Weather,

    /// Inspect events saved by the jsonl backend
    Events {
        #[command(subcommand)]
        command: EventsCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

#[derive(clap::Subcommand)]
enum EventsCommands {
    /// List saved events
    List {
        /// Only show one mode: "all", a category slug or custom category text
        #[arg(long, value_name = "MODE")]
        mode: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // The map owns the terminal, so it logs to a file instead of stderr.
    let _log_guard = if cli.command.is_none() {
        logging::init_file(&config::paths::logs_dir())?
    } else {
        logging::init_stderr();
        None
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, city } = cli;

    // default to the interactive map
    let Some(command) = command else {
        let config = load_config(city.as_deref())?;
        return commands::map::run(config).await;
    };

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Commands::Weather => {
            let config = load_config(city.as_deref())?;
            commands::weather::run(&config).await
        }
        Commands::Events { command } => match command {
            EventsCommands::List { mode } => {
                let config = load_config(city.as_deref())?;
                commands::events::list(&config, mode.as_deref())
            }
        },
    }
}

fn load_config(city: Option<&str>) -> Result<config::Config> {
    let mut config = config::Config::load().context("load config")?;
    if let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) {
        config.city = city.to_string();
    }
    Ok(config)
}
