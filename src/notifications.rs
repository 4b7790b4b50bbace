//! Operator notifications

use std::{collections::VecDeque, fmt};

use tracing::{error, info};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Neutral information
    Info,

    /// An operation succeeded
    Success,

    /// An operation failed
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Error => "error",
        })
    }
}

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: Level,

    /// Message text
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Queue of notifications waiting to be shown.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an informational message.
    pub fn push_info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    /// Queue a success message.
    pub fn push_success(&mut self, message: impl Into<String>) {
        let message = message.into();

        info!(%message, "operation succeeded");

        self.push(Level::Success, message);
    }

    /// Queue an error message.
    pub fn push_error(&mut self, message: impl Into<String>) {
        let message = message.into();

        error!(%message, "operation failed");

        self.push(Level::Error, message);
    }

    fn push(&mut self, level: Level, message: String) {
        self.queue.push_back(Notification { level, message });
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    /// Queued notifications, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    /// Number of queued notifications.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
