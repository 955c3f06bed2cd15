//! Core value types for the journal relay
//!
//! These are the transient records that flow between the locator, the tailer
//! and the watcher loop. None of them outlive a single poll cycle except the
//! offset the watcher chooses to keep.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// A journal file that passed the naming filter during a directory scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File name as seen during traversal (lossy UTF-8)
    pub name: String,
    /// Last modification time
    pub modified: Timestamp,
}

/// Result of one tail pass over the active file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailOutcome {
    /// Byte offset to remember for the next pass
    pub offset: u64,
    /// Latest line in this batch that passed the content filter
    pub matched: Option<String>,
}

impl TailOutcome {
    /// Outcome for a pass that found nothing new
    pub fn unchanged(offset: u64) -> Self {
        Self {
            offset,
            matched: None,
        }
    }
}

/// The file the watcher is currently tailing and how far it has been consumed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFile {
    pub path: PathBuf,
    pub offset: u64,
}

impl ActiveFile {
    /// Start tracking a newly activated file from its first byte
    pub fn new(path: PathBuf) -> Self {
        Self { path, offset: 0 }
    }
}
