//! Async task lifecycle tracking for fetch and poll tasks

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::task::JoinHandle;

/// Global active task counter
static ACTIVE_TASKS: AtomicU64 = AtomicU64::new(0);

/// Monotonic task id source
static TASK_IDS: AtomicU64 = AtomicU64::new(0);

/// Get current number of active tracked tasks
pub fn active_task_count() -> u64 {
    ACTIVE_TASKS.load(Ordering::Relaxed)
}

/// Spawn an instrumented async task with lifecycle tracking
///
/// # Arguments
///
/// * `name` - Task name for logging (e.g., "resource_fetch", "poll")
/// * `future` - The async task to execute
///
/// Aborted tasks (poll loops) are counted down by the drop guard, not by completion.
pub fn spawn_tracked<F>(name: &'static str, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let task_id = TASK_IDS.fetch_add(1, Ordering::Relaxed);
    ACTIVE_TASKS.fetch_add(1, Ordering::Relaxed);
    let start = Instant::now();

    tracing::trace!(task = %name, task_id, "Task spawned");

    tokio::spawn(async move {
        let _guard = ActiveGuard { name, task_id, start };
        future.await
    })
}

struct ActiveGuard {
    name: &'static str,
    task_id: u64,
    start: Instant,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        ACTIVE_TASKS.fetch_sub(1, Ordering::Relaxed);

        // Poll loops legitimately live long; only one-shot fetches are expected to be quick
        if self.name != "poll" && duration.as_secs() > 30 {
            tracing::warn!(
                task = %self.name,
                task_id = self.task_id,
                duration_ms = duration.as_millis(),
                "Task took very long (potential hang)"
            );
        } else {
            tracing::trace!(
                task = %self.name,
                task_id = self.task_id,
                duration_ms = duration.as_millis(),
                "Task finished"
            );
        }
    }
}
