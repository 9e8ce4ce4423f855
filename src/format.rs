//! Rendering of log entries
//!
//! Pure functions shared by the file sink and by anything that wants to show
//! an entry to a human. No I/O, no state.

use chrono::SecondsFormat;

use crate::entry::LogEntry;

/// Marker appended when the context cannot be rendered as JSON
const CONTEXT_FALLBACK: &str = "[Not serializable]";

/// Render an entry as a human-readable line
///
/// Layout: `[timestamp] [LEVEL] [source] message`, where the source bracket
/// appears only when a source is set. A non-empty context follows as a
/// pretty-printed JSON block on a new line. Never fails: an unserializable
/// context degrades to a placeholder marker.
pub fn display(entry: &LogEntry) -> String {
    let timestamp = entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut line = format!("[{}] [{}]", timestamp, entry.level.padded());
    if let Some(source) = &entry.source {
        line.push_str(&format!(" [{source}]"));
    }
    line.push(' ');
    line.push_str(&entry.message);

    if !entry.context.is_empty() {
        match serde_json::to_string_pretty(&entry.context) {
            Ok(json) => {
                line.push_str("\nContext: ");
                line.push_str(&json);
            }
            Err(_) => {
                line.push_str("\nContext: ");
                line.push_str(CONTEXT_FALLBACK);
            }
        }
    }

    line
}

/// Render an entry as a single JSON document
pub fn json(entry: &LogEntry) -> String {
    // String keys and serde-ready field types throughout, so this is total
    serde_json::to_string(entry).expect("log entries always serialize")
}
