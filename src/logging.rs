use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config;

/// Sets up a daily-rolling file log under the user data directory. Nothing
/// is ever written to stdout or stderr once the TUI owns the terminal.
/// The returned guard must stay alive for the life of the process.
pub fn init(log_level: &str) -> Result<WorkerGuard, String> {
    let dir = config::log_dir().ok_or_else(|| "Cannot determine log directory".to_string())?;
    fs::create_dir_all(&dir)
        .map_err(|e| format!("Cannot create log directory {}: {}", dir.display(), e))?;

    let file_appender = tracing_appender::rolling::daily(&dir, "termcbt.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter =
        EnvFilter::try_from_env("TERMCBT_LOG").unwrap_or_else(|_| EnvFilter::new(log_level));
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(guard)
}
