//! Logging configuration from environment variables

use std::path::PathBuf;

const DEFAULT_LOG_LEVEL: &str = "dashboard=info,warn";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level filter (e.g., "dashboard=debug,info")
    pub log_level: String,
    /// Log directory (for rotation)
    pub log_dir: PathBuf,
    /// Mirror log output to stderr
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: PathBuf::from("logs"),
            stderr: false,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("RUST_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),
            log_dir: lookup("DASHBOARD_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            stderr: lookup("DASHBOARD_LOG_STDERR")
                .map(|v| v == "1")
                .unwrap_or(defaults.stderr),
        }
    }

    /// Path of today's log file prefix
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(super::logger::LOG_FILE_NAME)
    }

    /// Check if debug logging is enabled
    pub fn is_debug_enabled(&self) -> bool {
        self.log_level.contains("debug") || self.log_level.contains("trace")
    }
}
