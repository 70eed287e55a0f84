//! Host logging sink.
//!
//! Structured log entries produced by the core can be mirrored into the host
//! platform's own logging pipeline (OSLog, Logcat, a console).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{error::Result, platform::PlatformSendSync};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Target module/component
    pub target: String,
    pub message: String,
    /// Structured fields recorded on the event
    pub fields: HashMap<String, String>,
    /// Name of the span the event was recorded in
    pub span_id: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: HashMap::new(),
            span_id: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }
}

/// Forwards structured logs from the core to the host logging pipeline.
///
/// Implementations must not block: entries are forwarded from inside
/// `tracing` layers, potentially on the session's UI task.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LoggerSink: PlatformSendSync {
    /// Forward a log entry to the host logging system
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Flush any buffered logs
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Minimum level this sink wants to receive.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Console logger for development builds and demos.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    pub min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl LoggerSink for ConsoleLogger {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level < self.min_level {
            return Ok(());
        }

        println!(
            "[{}] {} {}: {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.level.as_str(),
            entry.target,
            entry.message
        );

        if !entry.fields.is_empty() {
            println!("  Fields: {:?}", entry.fields);
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_builder() {
        let entry = LogEntry::new(LogLevel::Info, "core_playback", "Session started")
            .with_field("session_id", "abc")
            .with_span_id("start_session");

        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.target, "core_playback");
        assert_eq!(entry.message, "Session started");
        assert_eq!(entry.fields.get("session_id"), Some(&"abc".to_string()));
        assert_eq!(entry.span_id, Some("start_session".to_string()));
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::Warn.as_str(), "WARN");
    }

    #[tokio::test]
    async fn test_console_logger_filters_below_min_level() {
        let logger = ConsoleLogger {
            min_level: LogLevel::Warn,
        };
        let entry = LogEntry::new(LogLevel::Debug, "test", "ignored");

        logger.log(entry).await.unwrap();
        assert_eq!(logger.min_level(), LogLevel::Warn);
    }
}
