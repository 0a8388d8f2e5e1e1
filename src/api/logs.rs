//! Import progress log streaming via Server-Sent Events (SSE).
//!
//! The pipeline reports progress through a broadcast channel; the web UI
//! subscribes via the `/api/logs` endpoint while a run is in flight.
//! Entries are also echoed to stdout so CLI runs see the same output.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Severity of a log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single progress message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Global log broadcaster.
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Fans log entries out to all connected SSE clients.
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Echo to stdout and broadcast; absent subscribers are fine.
    pub fn log(&self, entry: LogEntry) {
        let prefix = match entry.level {
            LogLevel::Info => "  ",
            LogLevel::Success => "  ✓",
            LogLevel::Warning => "  ⚠",
            LogLevel::Error => "  ✗",
        };
        println!("{} {}", prefix, entry.message);

        let _ = self.sender.send(entry);
    }

    /// Get a receiver for SSE streaming.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(message: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, message));
}

pub fn log_success(message: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, message));
}

pub fn log_warning(message: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, message));
}

pub fn log_error(message: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Error, message));
}
