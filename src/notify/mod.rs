//! User-facing notifications
//!
//! Ledger operations report what happened through a [`NotificationSink`].
//! The CLI prints them; tests collect them.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
}

impl Severity {
    /// Prefix used when printing to a terminal
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "i",
            Self::Warn => "!",
        }
    }
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warn)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.icon(), self.message)
    }
}

/// Destination for notifications
pub trait NotificationSink {
    fn notify(&self, notification: Notification);

    fn info(&self, message: &str) {
        self.notify(Notification::info(message));
    }

    fn warn(&self, message: &str) {
        self.notify(Notification::warn(message));
    }
}

/// Prints notifications to stderr so stdout stays clean for command output
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, notification: Notification) {
        let _ = writeln!(std::io::stderr(), "{}", notification);
    }
}

/// Collects notifications in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    received: RefCell<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.received.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.received
            .borrow()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    /// Remove and return everything received so far
    pub fn drain(&self) -> Vec<Notification> {
        self.received.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.received.borrow().is_empty()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        self.received.borrow_mut().push(notification);
    }
}
