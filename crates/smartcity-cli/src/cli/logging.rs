//! Tracing subscriber setup.
//!
//! Filter comes from `SMARTCITY_LOG` (default `info`). One-shot commands log
//! to stderr; the interactive map logs to a daily file under the logs dir.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "SMARTCITY_LOG";
const LOG_FILE_PREFIX: &str = "smartcity.log";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Logs warnings and above to stderr unless `SMARTCITY_LOG` asks for more.
pub fn init_stderr() {
    let _ = tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Logs to `<logs_dir>/smartcity.log.<date>`.
///
/// The returned guard flushes the writer on drop; keep it alive for the
/// whole session.
pub fn init_file(logs_dir: &Path) -> Result<Option<WorkerGuard>> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("create logs dir {}", logs_dir.display()))?;
    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let installed = tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .is_ok();

    Ok(installed.then_some(guard))
}
