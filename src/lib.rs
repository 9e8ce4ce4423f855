//! Logbook - Embeddable file-based logging core
//!
//! An in-memory ring buffer for live inspection and search, paired with a
//! size-rotated append-only file sink for durable persistence. A `Logger`
//! facade fans records out to both, and a `tracing` capture layer feeds the
//! pair from ambient instrumentation.

pub mod buffer;
pub mod capture;
pub mod config;
pub mod entry;
pub mod file_sink;
pub mod format;
pub mod logger;
pub mod retention;

pub use buffer::{LogBuffer, Overflow, DEFAULT_MAX_ENTRIES};
pub use capture::CaptureLayer;
pub use config::LogStorageConfig;
pub use entry::{LogEntry, LogLevel};
pub use file_sink::{FileSink, SinkError};
pub use logger::Logger;
