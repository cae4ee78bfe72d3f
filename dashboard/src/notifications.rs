//! # Notifications
//!
//! User-facing notices driven by mutation outcomes (never by polling).
//!
//! Backed by a bounded `async-channel`; when nobody drains it the oldest notice is
//! dropped to make room, so publishing never blocks or grows without bound.

use crate::core::error::SyncError;

/// Queue capacity before the oldest notice is evicted
const NOTICE_CAPACITY: usize = 64;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A message for the presentation layer to show as a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn portfolio_reset() -> Self {
        Self::success("Portfolio reset")
    }

    pub fn bot_updated() -> Self {
        Self::success("Bot settings updated")
    }

    pub fn bot_toggled(active: bool) -> Self {
        if active {
            Self::success("Bot started")
        } else {
            Self::info("Bot stopped")
        }
    }

    pub fn coin_enabled(symbol: &str) -> Self {
        Self::success(format!("{} enabled", symbol))
    }

    pub fn coin_disabled(symbol: &str) -> Self {
        Self::info(format!("{} disabled", symbol))
    }

    pub fn mutation_failed(mutation: &str, err: &SyncError) -> Self {
        let reason = if err.is_unauthenticated() {
            "please log in".to_string()
        } else {
            err.to_string()
        };
        Self::error(format!("Failed to {}: {}", mutation, reason))
    }
}

/// Publishing side of the notice queue. Cloning shares the same queue.
#[derive(Clone)]
pub struct Notifier {
    tx: async_channel::Sender<Notice>,
    rx: async_channel::Receiver<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        let (tx, rx) = async_channel::bounded(NOTICE_CAPACITY);
        Self { tx, rx }
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notice, evicting the oldest one if the queue is full
    pub fn publish(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, message = %notice.message, "Notice");
        if let Err(e) = self.tx.force_send(notice) {
            tracing::warn!(error = %e, "Notice queue closed");
        }
    }

    /// A receiver for draining notices. Receivers compete: each notice is delivered once.
    pub fn receiver(&self) -> async_channel::Receiver<Notice> {
        self.rx.clone()
    }

    /// Notices currently queued
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let notifier = Notifier::new();
        let rx = notifier.receiver();

        notifier.publish(Notice::portfolio_reset());
        notifier.publish(Notice::coin_enabled("ETH"));

        assert_eq!(rx.try_recv().unwrap(), Notice::success("Portfolio reset"));
        assert_eq!(rx.try_recv().unwrap().message, "ETH enabled");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let notifier = Notifier::new();
        for i in 0..(NOTICE_CAPACITY + 3) {
            notifier.publish(Notice::info(format!("n{}", i)));
        }

        let rx = notifier.receiver();
        assert_eq!(notifier.pending(), NOTICE_CAPACITY);
        assert_eq!(rx.try_recv().unwrap().message, "n3");
    }

    #[test]
    fn test_mutation_failed_message() {
        let notice = Notice::mutation_failed(
            "reset portfolio",
            &SyncError::Unauthenticated { resource: "reset portfolio" },
        );
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Failed to reset portfolio: please log in");

        let notice = Notice::mutation_failed(
            "toggle bot",
            &SyncError::Http { status: 500, message: "boom".to_string() },
        );
        assert_eq!(notice.message, "Failed to toggle bot: HTTP 500: boom");
    }

    #[test]
    fn test_bot_toggled_levels() {
        assert_eq!(Notice::bot_toggled(true).level, NoticeLevel::Success);
        assert_eq!(Notice::bot_toggled(false).level, NoticeLevel::Info);
    }
}
