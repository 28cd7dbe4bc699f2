//! Alert system for displaying success and error messages to users.
//!
//! Flows push transient alerts into a shared [Notices] queue and the
//! presentation layer drains and displays them.

use std::sync::{Arc, Mutex};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    /// The operation completed.
    Success,
    /// The operation failed and the user may retry it.
    Error,
}

/// A transient notice for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Whether this is a success or an error alert.
    pub alert_type: AlertType,
    /// The headline.
    pub message: String,
    /// Optional extra text, empty if there is none.
    pub details: String,
}

impl Alert {
    /// Create a new success alert
    pub fn success(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Success,
            message: message.into(),
            details: details.into(),
        }
    }

    /// Create a new error alert
    pub fn error(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Error,
            message: message.into(),
            details: details.into(),
        }
    }

    /// Create a new error alert without details
    pub fn error_simple(message: impl Into<String>) -> Self {
        Self::error(message, "")
    }
}

/// A queue of alerts shared between the flows that raise them and the view
/// that shows them.
///
/// Cloning a [Notices] gives another handle to the same queue.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    queue: Arc<Mutex<Vec<Alert>>>,
}

impl Notices {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `alert` to the end of the queue.
    pub fn push(&self, alert: Alert) {
        match alert.alert_type {
            AlertType::Success => tracing::debug!("Notice: {}", alert.message),
            AlertType::Error => tracing::warn!("Error notice: {}", alert.message),
        }

        self.lock().push(alert);
    }

    /// Remove and return all queued alerts, oldest first.
    pub fn drain(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.lock())
    }

    /// The number of queued alerts.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Alert>> {
        // A panic while holding the lock cannot leave a Vec half-written, so
        // the poisoned data is still usable.
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod notices_tests {
    use crate::alert::{Alert, AlertType, Notices};

    #[test]
    fn drain_returns_alerts_in_order_and_empties_queue() {
        let notices = Notices::new();
        notices.push(Alert::success("Expense added", ""));
        notices.push(Alert::error_simple("Failed to load expenses"));

        let alerts = notices.drain();

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].alert_type, AlertType::Success);
        assert_eq!(alerts[1].message, "Failed to load expenses");
        assert!(notices.is_empty());
    }

    #[test]
    fn clones_share_the_same_queue() {
        let notices = Notices::new();
        let handle = notices.clone();

        handle.push(Alert::success("Welcome back!", ""));

        assert_eq!(notices.len(), 1);
    }
}
