//! # Debugging and Tracing Infrastructure
//!
//! - **File-based logging**: structured logs to `logs/dashboard.log` (daily rotation)
//! - **Async task tracking**: every fetch and poll loop is spawned through
//!   [`spawn_tracked`], which counts live tasks and flags hung fetches
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (default `dashboard=info,warn`)
//! - `DASHBOARD_LOG_DIR`: Log directory (default `logs`)
//! - `DASHBOARD_LOG_STDERR`: Mirror logs to stderr (1=on)

pub mod config;
pub mod logger;
pub mod task_tracker;

pub use config::LogConfig;
pub use logger::init as init_logger;
pub use task_tracker::{active_task_count, spawn_tracked};
