//! Bridge from `tracing` events into the sink pair
//!
//! [`CaptureLayer`] is a `tracing_subscriber::Layer` that converts every
//! tracing event into a [`LogEntry`]: the `message` field becomes the
//! message, the event target becomes the source and all remaining fields
//! land in the entry's context. The layer holds the shared [`Logger`] behind
//! a mutex since the subscriber may fire from any thread.

use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::entry::{LogEntry, LogLevel};
use crate::logger::Logger;

/// Install a global subscriber that feeds `logger`
///
/// Respects `RUST_LOG`, defaulting to `info`. Fails if a global subscriber
/// is already set.
pub fn init(logger: Arc<Mutex<Logger>>) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(CaptureLayer::new(logger))
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    Ok(())
}

/// Layer that records tracing events through a shared [`Logger`]
pub struct CaptureLayer {
    logger: Arc<Mutex<Logger>>,
}

impl CaptureLayer {
    /// Create a layer for composition into any subscriber stack
    pub fn new(logger: Arc<Mutex<Logger>>) -> Self {
        Self { logger }
    }
}

impl<S: tracing::Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        let mut entry = LogEntry::new(LogLevel::from(*meta.level()), visitor.message)
            .with_source(meta.target());
        if !visitor.fields.is_empty() {
            entry = entry.with_context(visitor.fields);
        }

        // A poisoned lock drops the event
        if let Ok(mut logger) = self.logger.lock() {
            logger.log_entry(entry);
        }
    }
}

/// Extracts the message and structured fields from a tracing event
struct FieldVisitor {
    message: String,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: String::new(),
            fields: Map::new(),
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .insert(field.name().into(), Value::String(format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.into();
        } else {
            self.fields
                .insert(field.name().into(), Value::String(value.into()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().into(), Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().into(), Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match serde_json::Number::from_f64(value) {
            Some(number) => {
                self.fields.insert(field.name().into(), Value::Number(number));
            }
            None => {
                self.fields
                    .insert(field.name().into(), Value::String(value.to_string()));
            }
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().into(), Value::Bool(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_logger() -> Arc<Mutex<Logger>> {
        Arc::new(Mutex::new(Logger::new()))
    }

    #[test]
    fn test_event_becomes_buffered_entry() {
        let logger = shared_logger();
        let subscriber =
            tracing_subscriber::registry().with(CaptureLayer::new(Arc::clone(&logger)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user = "alice", attempts = 3u64, "login accepted");
        });

        let logger = logger.lock().unwrap();
        let entries = logger.buffer().entries();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "login accepted");
        assert_eq!(
            entry.context.get("user"),
            Some(&Value::String("alice".into()))
        );
        assert_eq!(entry.context.get("attempts"), Some(&Value::from(3u64)));
        assert!(entry.source.as_deref().unwrap().contains("capture"));
    }

    #[test]
    fn test_level_mapping_and_formatted_message() {
        let logger = shared_logger();
        let subscriber =
            tracing_subscriber::registry().with(CaptureLayer::new(Arc::clone(&logger)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!("fine grained");
            tracing::error!("count is {}", 5);
        });

        let logger = logger.lock().unwrap();
        let entries = logger.buffer().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Debug);
        assert_eq!(entries[1].level, LogLevel::Error);
        assert_eq!(entries[1].message, "count is 5");
    }

    #[test]
    fn test_field_types_land_in_context() {
        let logger = shared_logger();
        let subscriber =
            tracing_subscriber::registry().with(CaptureLayer::new(Arc::clone(&logger)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(retries = -2i64, ratio = 0.5f64, ok = false, note = ?Some(1), "mixed");
        });

        let logger = logger.lock().unwrap();
        let entries = logger.buffer().entries();
        let context = &entries[0].context;
        assert_eq!(context.get("retries"), Some(&Value::from(-2i64)));
        assert_eq!(context.get("ratio"), Some(&Value::from(0.5f64)));
        assert_eq!(context.get("ok"), Some(&Value::Bool(false)));
        assert_eq!(context.get("note"), Some(&Value::String("Some(1)".into())));
    }

    #[test]
    fn test_event_without_fields_has_empty_context() {
        let logger = shared_logger();
        let subscriber =
            tracing_subscriber::registry().with(CaptureLayer::new(Arc::clone(&logger)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("bare");
        });

        let logger = logger.lock().unwrap();
        let entries = logger.buffer().entries();
        assert!(entries[0].context.is_empty());
    }

    #[test]
    fn test_enable_file_logging_under_capture_lock() {
        use crate::config::LogStorageConfig;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");

        let logger = shared_logger();
        let subscriber =
            tracing_subscriber::registry().with(CaptureLayer::new(Arc::clone(&logger)));

        // The layer dispatches into this logger, so nothing reachable from
        // sink setup or writes may emit a tracing event while the lock is
        // held
        tracing::subscriber::with_default(subscriber, || {
            let mut guard = logger.lock().unwrap();
            guard.enable_file_logging(LogStorageConfig {
                file_path: Some(path.clone()),
                ..LogStorageConfig::default()
            });
            assert!(guard.file_sink().is_enabled());
            guard.info("written while locked");
            guard.disable_file_logging();
        });

        let logger = logger.lock().unwrap();
        assert_eq!(logger.buffer().len(), 1);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("written while locked"));
    }

    #[test]
    fn test_init_rejects_second_global_subscriber() {
        let logger = shared_logger();
        assert!(init(Arc::clone(&logger)).is_ok());
        assert!(init(logger).is_err());
    }
}
