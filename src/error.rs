use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating the active journal file
#[derive(Error, Debug)]
pub enum LocateError {
    #[error("No journal file found under {0}")]
    NoCandidateFound(PathBuf),
}

/// Errors that can occur while tailing a journal file
///
/// Every variant is a recoverable read failure: the caller keeps its previous
/// offset and retries on the next poll cycle.
#[derive(Error, Debug)]
pub enum TailError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stat {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to seek {path} to offset {offset}: {source}")]
    Seek {
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when forwarding a line to the collector
#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Collector responded with {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("Failed to start HTTP runtime: {0}")]
    RuntimeError(#[from] std::io::Error),
}

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),
}
