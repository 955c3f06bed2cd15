/// Locator for the active journal file
pub mod locator;

/// Incremental reader for newly appended journal lines
pub mod tailer;

pub use locator::JournalLocator;
pub use tailer::JournalTailer;
