//! Configuration for the journal relay
//!
//! Loaded from a TOML file with two sections, `[watcher]` and `[forwarder]`.
//! Every field has a default so a partial (or empty) file is valid.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default file name prefix of journal files
pub const DEFAULT_FILE_PREFIX: &str = "Journal";
/// Default file name extension of journal files
pub const DEFAULT_FILE_EXTENSION: &str = ".log";
/// Default marker token a forwarded line must contain
pub const DEFAULT_MARKER: &str = "ColonisationConstructionDepot";
/// Default collector endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/save";

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub watcher: WatcherConfig,
    pub forwarder: ForwarderConfig,
}

/// Settings for locating and tailing journal files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Root directory to scan; resolved from the platform when unset
    pub journal_dir: Option<PathBuf>,
    /// Journal file names must start with this
    pub file_prefix: String,
    /// Journal file names must end with this
    pub file_extension: String,
    /// Lines must contain this token to be forwarded
    pub marker: String,
    /// Seconds between poll cycles
    pub poll_interval_seconds: u64,
}

/// Settings for the HTTP forwarder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwarderConfig {
    pub endpoint: String,
    pub content_type: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Print every forwarded line to stdout
    pub echo_lines: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            journal_dir: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            poll_interval_seconds: 5,
        }
    }
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            content_type: "application/json".to_string(),
            timeout_seconds: 10,
            echo_lines: true,
        }
    }
}

impl WatcherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// The configured journal directory, or the platform default
    pub fn resolved_journal_dir(&self) -> PathBuf {
        self.journal_dir.clone().unwrap_or_else(default_journal_dir)
    }
}

impl ForwarderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::ParseError` if it is not valid TOML for this schema and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let watcher = &self.watcher;
        for (name, value) in [
            ("watcher.file_prefix", &watcher.file_prefix),
            ("watcher.file_extension", &watcher.file_extension),
            ("watcher.marker", &watcher.marker),
        ] {
            if value.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }

        if watcher.poll_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "watcher.poll_interval_seconds must be at least 1".to_string(),
            ));
        }

        let forwarder = &self.forwarder;
        if !(forwarder.endpoint.starts_with("http://") || forwarder.endpoint.starts_with("https://"))
        {
            return Err(ConfigError::ValidationError(format!(
                "forwarder.endpoint must be an http(s) URL, got '{}'",
                forwarder.endpoint
            )));
        }

        if forwarder.content_type.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "forwarder.content_type must not be empty".to_string(),
            ));
        }

        if forwarder.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "forwarder.timeout_seconds must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Resolve the platform's journal directory
///
/// On Windows this is the game's save-data folder under the user's home.
/// Elsewhere the relative path `Journal.log` is used, which lets a single
/// file or directory of that name in the working directory be watched.
pub fn default_journal_dir() -> PathBuf {
    if cfg!(windows) {
        let home = dirs::home_dir().unwrap_or_default();
        home.join("Saved Games")
            .join("Frontier Developments")
            .join("Elite Dangerous")
    } else {
        PathBuf::from("Journal.log")
    }
}
