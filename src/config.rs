//! Configuration for the durable log sink

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filename prefix shared by default-named log files
pub const LOG_FILE_PREFIX: &str = "logbook-";

/// Settings for the rotating file sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogStorageConfig {
    /// Explicit log file path; when absent, a timestamped default under
    /// [`logs_dir`] is generated at initialization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Rotation threshold in megabytes; fractional values are allowed
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: f64,

    /// Depth of the numbered backup chain; generations `.1` (newest) through
    /// `.{max_files - 1}` (oldest) are kept, older ones are deleted
    #[serde(default = "default_max_files")]
    pub max_files: u32,
}

fn default_max_size_mb() -> f64 {
    5.0
}

fn default_max_files() -> u32 {
    3
}

impl Default for LogStorageConfig {
    fn default() -> Self {
        Self {
            file_path: None,
            max_size_mb: default_max_size_mb(),
            max_files: default_max_files(),
        }
    }
}

impl LogStorageConfig {
    /// Load configuration from the default location, or defaults if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).context("Failed to read log config file")?;
            toml::from_str(&content).context("Failed to parse log config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context("Failed to create directory for log config file")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize log config")?;
        std::fs::write(path, content).context("Failed to write log config file")?;
        Ok(())
    }
}

/// Get the base data directory (~/.logbook)
/// Falls back to ./.logbook if the home directory cannot be determined
pub fn base_dir() -> PathBuf {
    base_dir_from(dirs::home_dir())
}

// Reached from sink initialization under the capture layer's logger lock;
// a tracing event emitted here would re-enter that lock, so the missing-home
// fallback stays silent
fn base_dir_from(home: Option<PathBuf>) -> PathBuf {
    home.map(|h| h.join(".logbook"))
        .unwrap_or_else(|| PathBuf::from(".logbook"))
}

/// Try to get the base data directory, returning None if home dir is unavailable
pub fn try_base_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".logbook"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    base_dir().join("config.toml")
}

/// Get the default logs directory
pub fn logs_dir() -> PathBuf {
    base_dir().join("logs")
}

/// Generate the default timestamped log file name
///
/// The name embeds a sortable RFC 3339 timestamp with colons replaced by
/// hyphens, so it is valid on every filesystem.
pub fn default_log_file_name() -> String {
    let timestamp = Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "-");
    format!("{LOG_FILE_PREFIX}{timestamp}.log")
}
