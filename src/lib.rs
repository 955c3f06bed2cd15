/// Error types for the journal relay
pub mod error;

/// Value types passed between components
pub mod events;

/// Journal file locator and tailer
pub mod collectors;

/// Delivery of matched lines to the collector
pub mod forwarder;

/// Poll loop with rotation handling
pub mod watcher;

/// Configuration management
pub mod config;

// Re-export commonly used types
pub use error::{ConfigError, ForwardError, LocateError, TailError};
pub use watcher::{JournalWatcher, PollOutcome};
