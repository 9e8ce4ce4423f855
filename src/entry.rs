//! Log entries and severity levels
//!
//! A [`LogEntry`] is created once and never mutated afterwards; both sinks
//! receive the same record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a log entry, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Get the display name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Label padded to a fixed width of 5 so log columns line up
    pub fn padded(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warn => "WARN ",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            // No TRACE variant here; clamp to the lowest severity
            tracing::Level::TRACE | tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when the entry was created
    pub timestamp: DateTime<Utc>,
    /// Severity level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Structured values attached to the entry
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Origin tag (e.g. a component name); omitted from JSON when absent,
    /// which keeps "no source" distinct from an explicit empty string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current time
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            context: Map::new(),
            source: None,
        }
    }

    /// Attach structured context values
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Attach an origin tag
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_level_padded_width() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            assert_eq!(level.padded().len(), 5);
            assert_eq!(level.padded().trim(), level.as_str());
        }
    }

    #[test]
    fn test_level_from_tracing() {
        assert_eq!(LogLevel::from(tracing::Level::TRACE), LogLevel::Debug);
        assert_eq!(LogLevel::from(tracing::Level::DEBUG), LogLevel::Debug);
        assert_eq!(LogLevel::from(tracing::Level::INFO), LogLevel::Info);
        assert_eq!(LogLevel::from(tracing::Level::WARN), LogLevel::Warn);
        assert_eq!(LogLevel::from(tracing::Level::ERROR), LogLevel::Error);
    }

    #[test]
    fn test_entry_defaults() {
        let entry = LogEntry::new(LogLevel::Info, "hello");
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "hello");
        assert!(entry.context.is_empty());
        assert!(entry.source.is_none());
    }

    #[test]
    fn test_entry_builder() {
        let mut context = Map::new();
        context.insert("port".to_string(), json!(5555));

        let entry = LogEntry::new(LogLevel::Warn, "bind failed")
            .with_context(context)
            .with_source("listener");

        assert_eq!(entry.context["port"], json!(5555));
        assert_eq!(entry.source.as_deref(), Some("listener"));
    }

    #[test]
    fn test_missing_source_is_omitted_from_json() {
        let without = serde_json::to_string(&LogEntry::new(LogLevel::Info, "a")).unwrap();
        assert!(!without.contains("\"source\""));

        // An explicit empty string is still serialized
        let with = serde_json::to_string(&LogEntry::new(LogLevel::Info, "a").with_source(""))
            .unwrap();
        assert!(with.contains("\"source\":\"\""));
    }
}
