// SPDX-License-Identifier: MIT
//
// Logging setup.
//
// The terminal is in raw mode on the alternate screen while nib runs, so
// nothing may be printed to it. Logs go to a daily-rolling file under
// `<data dir>/nib/logs/` instead. The filter comes from `RUST_LOG`, else
// `--log-level`, else `warn`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn";
const LOG_FILE_PREFIX: &str = "nib.log";

/// `<data dir>/nib/logs`
#[must_use]
pub fn logs_dir() -> PathBuf {
    crate::config::data_dir().join("logs")
}

/// Pick the filter directives: the environment first, then the flag.
fn filter(cli_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli_level.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to `dir`. Keep the returned guard
/// alive for the whole run; dropping it flushes buffered lines.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init(dir: &Path, cli_level: Option<&str>) -> anyhow::Result<WorkerGuard> {
    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter(cli_level))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .try_init()?;

    tracing::info!(dir = %dir.display(), "logging started");
    Ok(guard)
}
