//! In-memory log buffer
//!
//! A bounded FIFO history of entries for live inspection, independent of the
//! file sink. Single-writer: methods take `&mut self` and there is no
//! internal locking; callers with concurrent writers must serialize
//! externally (see [`crate::capture`] for the shared-logger case).

use std::collections::VecDeque;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::entry::{LogEntry, LogLevel};

/// Default maximum number of buffered entries
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Notification emitted when the buffer evicts entries to respect its cap
///
/// One event per overflowing add, or a single event covering the whole batch
/// when [`LogBuffer::set_max_entries`] shrinks the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    /// Number of entries evicted in this event
    pub evicted: usize,
}

/// Bounded FIFO buffer of log entries
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
    subscribers: Vec<mpsc::UnboundedSender<Overflow>>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl LogBuffer {
    /// Create a buffer holding at most `max_entries` entries
    ///
    /// Panics when `max_entries` is zero, the same contract violation
    /// [`set_max_entries`](Self::set_max_entries) reports as an error.
    pub fn new(max_entries: usize) -> Self {
        assert!(max_entries > 0, "max entries must be greater than zero");
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
            subscribers: Vec::new(),
        }
    }

    /// Subscribe to overflow notifications
    ///
    /// Emission is fire-and-forget; a dropped receiver is pruned on the next
    /// notification.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Overflow> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Append an entry, evicting the oldest one when over capacity
    pub fn add_entry(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        if self.entries.len() > self.max_entries {
            self.entries.pop_front();
            self.notify(Overflow { evicted: 1 });
        }
    }

    /// Snapshot of all entries, oldest first
    ///
    /// Returns an independent copy; mutating it does not touch the buffer.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Snapshot of entries at a given level, oldest first
    pub fn entries_by_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Number of buffered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of buffered entries at a given level
    pub fn count_by_level(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    /// Remove all entries; emits no overflow event
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Change the capacity
    ///
    /// Fails on a zero cap without touching any state. Shrinking below the
    /// current size evicts the oldest entries in one batch and emits a
    /// single overflow event for the whole batch.
    pub fn set_max_entries(&mut self, max: usize) -> Result<()> {
        if max == 0 {
            anyhow::bail!("max entries must be greater than zero");
        }

        self.max_entries = max;
        if self.entries.len() > max {
            let evicted = self.entries.len() - max;
            self.entries.drain(..evicted);
            self.notify(Overflow { evicted });
        }
        Ok(())
    }

    /// Current capacity
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Case-insensitive substring search against message and source
    ///
    /// Entries without a source can only match on their message.
    pub fn search(&self, text: &str) -> Vec<LogEntry> {
        let needle = text.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.message.to_lowercase().contains(&needle)
                    || e.source
                        .as_ref()
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    fn notify(&mut self, event: Overflow) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}
