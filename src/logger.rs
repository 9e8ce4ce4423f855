//! Unified logging front end
//!
//! Owns the sink pair and fans each accepted record out to both: the file
//! sink first for the durable view, then the in-memory buffer for live
//! inspection and search. A minimum-level gate drops records before either
//! sink sees them.

use crate::buffer::LogBuffer;
use crate::config::LogStorageConfig;
use crate::entry::{LogEntry, LogLevel};
use crate::file_sink::FileSink;

/// Facade over the buffer and file sink pair
pub struct Logger {
    min_level: LogLevel,
    buffer: LogBuffer,
    sink: FileSink,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a logger with a default-capacity buffer, a disabled file sink
    /// and the level gate fully open
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Debug,
            buffer: LogBuffer::default(),
            sink: FileSink::new(),
        }
    }

    /// Record an entry built elsewhere
    ///
    /// Entries below the minimum level are dropped. Accepted entries are
    /// written to the file sink first, then moved into the buffer.
    pub fn log_entry(&mut self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        self.sink.write_entry(&entry);
        self.buffer.add_entry(entry);
    }

    /// Record a plain message at the given level
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_entry(LogEntry::new(level, message));
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Start persisting records to a log file
    ///
    /// Failures surface on the file sink's error channel, not here.
    pub fn enable_file_logging(&mut self, config: LogStorageConfig) {
        self.sink.initialize(config);
    }

    /// Stop persisting records; buffered history is unaffected
    pub fn disable_file_logging(&mut self) {
        self.sink.disable();
    }

    /// Lowest level that is recorded
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut LogBuffer {
        &mut self.buffer
    }

    pub fn file_sink(&self) -> &FileSink {
        &self.sink
    }

    pub fn file_sink_mut(&mut self) -> &mut FileSink {
        &mut self.sink
    }
}
