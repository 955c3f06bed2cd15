use crate::error::LocateError;
use crate::events::{CandidateFile, Timestamp};
use log::debug;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Finds the journal file the game is currently writing to
///
/// Walks the whole directory tree on every call and picks the most recently
/// modified file whose name matches the configured prefix and extension.
/// Nothing is cached between calls, so files appearing or disappearing
/// between polls are always reflected.
#[derive(Debug, Clone)]
pub struct JournalLocator {
    prefix: String,
    extension: String,
}

impl JournalLocator {
    /// Create a locator for files named `<prefix>...<extension>`
    ///
    /// # Example
    ///
    /// ```rust
    /// use journal_relay::collectors::JournalLocator;
    ///
    /// let locator = JournalLocator::new("Journal", ".log");
    /// assert!(locator.matches_name("Journal.2024-05-01T120000.01.log"));
    /// assert!(!locator.matches_name("Status.json"));
    /// ```
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// Check a file name against the naming filter
    pub fn matches_name(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) && name.ends_with(&self.extension)
    }

    /// Return every file under `root` that passes the naming filter, in
    /// traversal order
    ///
    /// Entries that cannot be read (permission denied, vanished mid-walk,
    /// unreadable metadata) are skipped.
    pub fn candidates(&self, root: &Path) -> Vec<CandidateFile> {
        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.inspect(&entry))
            .collect()
    }

    /// Select the active journal file under `root`
    ///
    /// The candidate with the latest modification time wins. When several
    /// share that time, the one seen last during traversal wins.
    ///
    /// # Errors
    ///
    /// Returns `LocateError::NoCandidateFound` when no file matches, including
    /// when `root` itself does not exist.
    pub fn locate(&self, root: &Path) -> Result<CandidateFile, LocateError> {
        let mut latest: Option<CandidateFile> = None;

        for candidate in self.candidates(root) {
            let newer = latest
                .as_ref()
                .map_or(true, |current| candidate.modified >= current.modified);
            if newer {
                latest = Some(candidate);
            }
        }

        latest.ok_or_else(|| LocateError::NoCandidateFound(root.to_path_buf()))
    }

    fn inspect(&self, entry: &DirEntry) -> Option<CandidateFile> {
        let name = entry.file_name().to_string_lossy();
        if !self.matches_name(&name) {
            return None;
        }

        let modified = match entry.metadata().map(|m| m.modified()) {
            Ok(Ok(modified)) => modified,
            Ok(Err(e)) => {
                debug!("No modification time for {}: {}", entry.path().display(), e);
                return None;
            }
            Err(e) => {
                debug!("Cannot stat {}: {}", entry.path().display(), e);
                return None;
            }
        };

        Some(CandidateFile {
            path: entry.path().to_path_buf(),
            name: name.into_owned(),
            modified: Timestamp::from(modified),
        })
    }
}
