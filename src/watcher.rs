//! Poll loop tying the locator, tailer and sink together
//!
//! The watcher owns the only mutable state in the relay: which journal file
//! is active and how many of its bytes have been consumed. Each cycle runs
//! locate, tail and forward strictly in sequence, then sleeps.

use crate::collectors::{JournalLocator, JournalTailer};
use crate::config::WatcherConfig;
use crate::events::ActiveFile;
use crate::forwarder::Sink;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// What happened during one poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// No journal file matched; state was left untouched
    NoCandidate,
    /// The active file was read (possibly with nothing new)
    Tailed { rotated: bool, forwarded: bool },
    /// The active file could not be read; its offset was kept
    ReadFailed { rotated: bool },
}

/// Watches a journal directory and forwards the freshest matching line
pub struct JournalWatcher<S: Sink> {
    journal_dir: PathBuf,
    locator: JournalLocator,
    tailer: JournalTailer,
    poll_interval: Duration,
    sink: S,
    current: Option<ActiveFile>,
}

impl<S: Sink> JournalWatcher<S> {
    /// Create a watcher from configuration, delivering matches to `sink`
    pub fn new(config: &WatcherConfig, sink: S) -> Self {
        Self {
            journal_dir: config.resolved_journal_dir(),
            locator: JournalLocator::new(&config.file_prefix, &config.file_extension),
            tailer: JournalTailer::new(&config.marker),
            poll_interval: config.poll_interval(),
            sink,
            current: None,
        }
    }

    /// Root directory scanned for journal files
    pub fn journal_dir(&self) -> &Path {
        &self.journal_dir
    }

    /// The file being tailed and its consumed offset, if any
    pub fn current(&self) -> Option<&ActiveFile> {
        self.current.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run a single locate, tail and forward cycle
    ///
    /// Every failure is contained here: nothing propagates to the caller,
    /// and the next cycle starts from whatever state this one left.
    pub fn poll_once(&mut self) -> PollOutcome {
        let latest = match self.locator.locate(&self.journal_dir) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!("Error finding latest file: {}", e);
                return PollOutcome::NoCandidate;
            }
        };

        let (mut active, rotated) = match self.current.take() {
            Some(active) if active.path == latest.path => (active, false),
            _ => {
                info!("Now watching: {}", latest.path.display());
                (ActiveFile::new(latest.path), true)
            }
        };

        let outcome = match self.tailer.read_new_lines(&active.path, active.offset) {
            Ok(tail) => {
                active.offset = tail.offset;
                let forwarded = match tail.matched {
                    Some(line) => {
                        debug!("Forwarding line from {}", active.path.display());
                        self.sink.forward(&line);
                        true
                    }
                    None => false,
                };
                PollOutcome::Tailed { rotated, forwarded }
            }
            Err(e) => {
                error!("{}", e);
                PollOutcome::ReadFailed { rotated }
            }
        };

        self.current = Some(active);
        outcome
    }

    /// Poll until a shutdown signal arrives
    ///
    /// Sleeps for the poll interval between cycles. The loop ends when a
    /// message is received on `shutdown` or its sender is dropped.
    pub fn run(&mut self, shutdown: &Receiver<()>) {
        info!(
            "Watching {} every {:?}",
            self.journal_dir.display(),
            self.poll_interval
        );

        loop {
            self.poll_once();

            match shutdown.recv_timeout(self.poll_interval) {
                Ok(()) => {
                    info!("Watcher received shutdown signal");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Shutdown channel disconnected");
                    break;
                }
            }
        }

        info!("Watcher stopped");
    }
}
