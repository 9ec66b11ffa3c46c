//! services/client/src/views/notify.rs
//!
//! Transient notifications ("toasts") published by views after an action.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// A shared queue of toasts. The front end drains it after each action.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    queue: Arc<Mutex<Vec<Toast>>>,
}

impl Notifications {
    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "Notification.");
        self.push(ToastLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message.into());
    }

    fn push(&self, level: ToastLevel, message: String) {
        self.queue.lock().push(Toast { level, message });
    }

    /// Removes and returns every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn last(&self) -> Option<Toast> {
        self.queue.lock().last().cloned()
    }
}
