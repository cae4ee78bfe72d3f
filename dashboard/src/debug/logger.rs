//! File-based logging initialization

use super::config::LogConfig;
use crate::core::error::{Result, SyncError};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Prefix of the daily rolling log file
pub const LOG_FILE_NAME: &str = "dashboard.log";

/// Initialize the logging system
///
/// Sets up file-based logging with:
/// - Daily log rotation under `config.log_dir`
/// - Non-blocking writes so fetch tasks never wait on disk
/// - Optional mirror to stderr (`DASHBOARD_LOG_STDERR=1`)
/// - Panic hook that records panics in the log
///
/// The returned guard flushes buffered lines when dropped; keep it alive for the
/// lifetime of the program.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.log_dir).map_err(|e| {
        SyncError::Config(format!(
            "failed to create log directory {}: {}",
            config.log_dir.display(),
            e
        ))
    })?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new("dashboard=info,warn"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI codes in log files

    let stderr_layer = config.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .boxed()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| SyncError::Config(format!("logger already initialized: {}", e)))?;

    tracing::info!(
        log_file = %config.log_file().display(),
        log_level = %config.log_level,
        stderr = config.stderr,
        "Logging initialized"
    );

    setup_panic_hook();
    Ok(guard)
}

/// Log panics with their location before the default handler runs
fn setup_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic message".to_string()
        };

        tracing::error!(location = %location, message = %message, "Application panic");
        default_panic(panic_info);
    }));
}
