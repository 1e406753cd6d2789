use anyhow::{anyhow, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ANKTUI_LOG";
pub const LOG_FILE: &str = "anktui.log";

/// Sends tracing output to `<dir>/anktui.log`; stdout belongs to the TUI.
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init(dir: &Path, debug: bool) -> Result<WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;

    Ok(guard)
}
