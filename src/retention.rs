//! Log file retention management
//!
//! Handles cleanup of old log files based on age.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::Result;

use crate::config;

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

/// Clean up log files older than the retention period
///
/// Returns the number of files deleted.
pub fn cleanup_old_logs(logs_dir: &Path) -> Result<usize> {
    cleanup_old_logs_with_retention(logs_dir, DEFAULT_RETENTION_DAYS)
}

/// Clean up log files older than the specified number of days
///
/// Rotated generations (`.log.1`, `.log.2`, ...) are covered as well.
/// Returns the number of files deleted.
pub fn cleanup_old_logs_with_retention(logs_dir: &Path, retention_days: u64) -> Result<usize> {
    if !logs_dir.exists() {
        return Ok(0);
    }

    let retention_duration = Duration::from_secs(retention_days * 24 * 60 * 60);
    let cutoff = SystemTime::now()
        .checked_sub(retention_duration)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut deleted_count = 0;

    for entry in fs::read_dir(logs_dir)? {
        let entry = entry?;
        let path = entry.path();

        // Only process files this crate produced
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !is_log_file(name) {
                continue;
            }
        } else {
            continue;
        }

        // Check file modification time
        if let Ok(metadata) = entry.metadata() {
            if let Ok(modified) = metadata.modified() {
                if modified < cutoff && fs::remove_file(&path).is_ok() {
                    deleted_count += 1;
                }
            }
        }
    }

    Ok(deleted_count)
}

/// Whether a file name belongs to this crate's log output
fn is_log_file(name: &str) -> bool {
    if !name.starts_with(config::LOG_FILE_PREFIX) {
        return false;
    }
    if name.ends_with(".log") {
        return true;
    }
    // Rotated generations carry a numeric suffix: app.log.1, app.log.2, ...
    match name.rsplit_once('.') {
        Some((stem, generation)) => {
            stem.ends_with(".log")
                && !generation.is_empty()
                && generation.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_cleanup_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let count = cleanup_old_logs(temp_dir.path()).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cleanup_nonexistent_dir() {
        let path = Path::new("/nonexistent/path/for/testing");
        let count = cleanup_old_logs(path).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cleanup_ignores_foreign_files() {
        let temp_dir = TempDir::new().unwrap();

        // Create a non-log file
        let other_file = temp_dir.path().join("other.txt");
        File::create(&other_file)
            .unwrap()
            .write_all(b"test")
            .unwrap();

        // Create a log file with wrong prefix
        let wrong_prefix = temp_dir.path().join("other-2026-01-01T00-00-00.log");
        File::create(&wrong_prefix)
            .unwrap()
            .write_all(b"test")
            .unwrap();

        let count = cleanup_old_logs_with_retention(temp_dir.path(), 0).unwrap();
        assert_eq!(count, 0);

        // Files should still exist
        assert!(other_file.exists());
        assert!(wrong_prefix.exists());
    }

    #[test]
    fn test_cleanup_keeps_recent_files() {
        let temp_dir = TempDir::new().unwrap();

        // Create a recent log file
        let log_file = temp_dir.path().join("logbook-2026-01-21T14-30-45.123Z.log");
        File::create(&log_file)
            .unwrap()
            .write_all(b"test log content")
            .unwrap();

        let count = cleanup_old_logs(temp_dir.path()).unwrap();
        assert_eq!(count, 0);

        // File should still exist
        assert!(log_file.exists());
    }

    #[test]
    fn test_cleanup_deletes_expired_files_and_generations() {
        let temp_dir = TempDir::new().unwrap();

        let active = temp_dir.path().join("logbook-2026-01-01T00-00-00.000Z.log");
        let rotated = temp_dir.path().join("logbook-2026-01-01T00-00-00.000Z.log.1");
        let foreign = temp_dir.path().join("notes.txt");
        for path in [&active, &rotated, &foreign] {
            File::create(path).unwrap().write_all(b"test").unwrap();
        }

        // Make sure the files' mtimes land strictly before the cutoff
        std::thread::sleep(Duration::from_millis(10));

        let count = cleanup_old_logs_with_retention(temp_dir.path(), 0).unwrap();
        assert_eq!(count, 2);
        assert!(!active.exists());
        assert!(!rotated.exists());
        assert!(foreign.exists());
    }

    #[test]
    fn test_is_log_file_matcher() {
        assert!(is_log_file("logbook-2026-01-21T14-30-45.123Z.log"));
        assert!(is_log_file("logbook-2026-01-21T14-30-45.123Z.log.1"));
        assert!(is_log_file("logbook-2026-01-21T14-30-45.123Z.log.12"));

        assert!(!is_log_file("other-2026-01-21T14-30-45.123Z.log"));
        assert!(!is_log_file("logbook-2026-01-21.txt"));
        assert!(!is_log_file("logbook-2026-01-21T14-30-45.123Z.log.bak"));
        assert!(!is_log_file("logbook-2026-01-21T14-30-45.123Z.log."));
    }
}
