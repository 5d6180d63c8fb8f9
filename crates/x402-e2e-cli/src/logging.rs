//! Logging initialization: `--log-file` writes structured logs to a
//! rolling-never appender; otherwise logs go to stderr. Follows
//! `turbomcp-server::logging`'s guard-for-file-logging discipline, pared
//! down to the orchestrator's one `--verbose` / `--log-file` surface.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Must be held for the lifetime of `main` when file logging is active;
/// dropping it early truncates buffered-but-unflushed log lines.
pub struct LoggingGuard(#[allow(dead_code)] Option<WorkerGuard>);

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    })
}

/// Initializes the global tracing subscriber. When `log_file` is set, logs
/// are written there (directory created if needed) in addition to stderr.
pub fn init(verbose: bool, log_file: Option<&Path>) -> io::Result<LoggingGuard> {
    let registry = tracing_subscriber::registry().with(filter(verbose));

    let Some(path) = log_file else {
        registry
            .with(fmt::layer().with_writer(io::stderr))
            .try_init()
            .map_err(io::Error::other)?;
        return Ok(LoggingGuard(None));
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log file path has no file name"))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    registry
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard(Some(guard)))
}
