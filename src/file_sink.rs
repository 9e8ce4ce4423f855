//! Rotating file sink
//!
//! Durable, append-only persistence of log entries, parallel to the
//! in-memory buffer. The sink starts disabled; every filesystem failure is
//! reported through the error channel instead of a returned error, so a
//! logging call can never take the host down with it.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::{self, LogStorageConfig};
use crate::entry::LogEntry;
use crate::format;

/// Error notification emitted by [`FileSink`]
///
/// Delivered only through the event channel; sink methods themselves never
/// fail or panic.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SinkError {
    /// Description of the failed operation and its cause
    pub message: String,
}

/// Durable rotating log sink
///
/// Two states: disabled (initial, no open handle, no active path) and
/// enabled (exactly one append-mode handle bound to `current_path`).
pub struct FileSink {
    config: LogStorageConfig,
    current_path: Option<PathBuf>,
    file: Option<File>,
    subscribers: Vec<mpsc::UnboundedSender<SinkError>>,
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSink {
    /// Create a sink in the disabled state
    pub fn new() -> Self {
        Self {
            config: LogStorageConfig::default(),
            current_path: None,
            file: None,
            subscribers: Vec::new(),
        }
    }

    /// Subscribe to error notifications
    ///
    /// Emission is fire-and-forget; a dropped receiver is pruned on the next
    /// notification.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SinkError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Enable the sink
    ///
    /// Resolves the active path from `config` (creating missing
    /// directories), opens an append-mode handle and immediately runs a
    /// rotation check so a pre-existing oversized file is rotated before its
    /// first write. Any failure emits one error event and leaves the sink
    /// disabled. Re-initializing an enabled sink closes the previous handle
    /// first.
    pub fn initialize(&mut self, config: LogStorageConfig) {
        self.disable();
        self.config = config;

        if let Err(err) = self.open_stream() {
            self.file = None;
            self.current_path = None;
            self.emit(&err);
            return;
        }
        self.check_rotation();
    }

    /// Disable the sink, flushing and closing the active handle. Idempotent.
    pub fn disable(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(err) = file.flush() {
                let err = anyhow::Error::from(err).context("Failed to flush log file on close");
                self.emit(&err);
            }
        }
        self.current_path = None;
    }

    /// Write one entry; a silent no-op while disabled
    ///
    /// The rotation check runs before the append, so a full active file is
    /// rotated away rather than absorbing one more record. Write failures
    /// emit an error event and the record is dropped; the in-memory buffer
    /// holds it independently.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        if self.file.is_none() {
            return;
        }
        self.check_rotation();

        // Rotation may have degraded the sink to disabled
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let line = format::display(entry);
        if let Err(err) = writeln!(file, "{line}") {
            let err = anyhow::Error::from(err).context("Failed to write log entry");
            self.emit(&err);
        }
    }

    /// Whether the sink currently owns an open handle
    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the active log file while enabled
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Tear the sink down: disable and release all event subscriptions
    ///
    /// Subscribed receivers observe the channel closing.
    pub fn dispose(mut self) {
        self.disable();
        self.subscribers.clear();
    }

    fn open_stream(&mut self) -> Result<()> {
        let path = match &self.config.file_path {
            Some(explicit) => {
                if let Some(parent) = explicit.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create log directory {}", parent.display())
                    })?;
                }
                explicit.clone()
            }
            None => {
                let dir = config::logs_dir();
                fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
                dir.join(config::default_log_file_name())
            }
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        self.current_path = Some(path);
        self.file = Some(file);
        Ok(())
    }

    fn check_rotation(&mut self) {
        let Some(path) = self.current_path.clone() else {
            return;
        };

        let size = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
            Err(err) => {
                let err = anyhow::Error::from(err)
                    .context(format!("Failed to stat log file {}", path.display()));
                self.emit(&err);
                return;
            }
        };

        let size_mb = size as f64 / (1024.0 * 1024.0);
        if size_mb < self.config.max_size_mb {
            return;
        }

        if let Err(err) = self.rotate(&path) {
            self.emit(&err);
            // Best effort: keep appending to the previous active file
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => self.file = Some(file),
                Err(_) => {
                    self.file = None;
                    self.current_path = None;
                }
            }
        }
    }

    /// Shift numbered backups one generation older (dropping the oldest),
    /// archive the active file as `.1` and start a fresh one
    fn rotate(&mut self, path: &Path) -> Result<()> {
        // The handle must be closed before the active file is renamed
        self.file = None;

        let max_files = self.config.max_files;
        for generation in (1..max_files).rev() {
            let from = rotated_path(path, generation);
            if !from.exists() {
                continue;
            }
            if generation == max_files - 1 {
                fs::remove_file(&from).with_context(|| {
                    format!("Failed to delete oldest log generation {}", from.display())
                })?;
            } else {
                let to = rotated_path(path, generation + 1);
                fs::rename(&from, &to).with_context(|| {
                    format!("Failed to shift log generation {}", from.display())
                })?;
            }
        }

        fs::rename(path, rotated_path(path, 1))
            .with_context(|| format!("Failed to archive active log file {}", path.display()))?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to reopen log file {}", path.display()))?;
        self.file = Some(file);
        Ok(())
    }

    fn emit(&mut self, err: &anyhow::Error) {
        let event = SinkError {
            message: format!("{err:#}"),
        };
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Numbered backup path: `app.log` becomes `app.log.<generation>`
fn rotated_path(path: &Path, generation: u32) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{generation}"));
    path.with_file_name(name)
}
