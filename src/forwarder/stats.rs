use crate::events::Timestamp;
use chrono::Utc;

/// Running totals of forwarding attempts
///
/// Purely observational: the watcher never consults these to decide what
/// to do next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardStats {
    /// Lines that were accepted by the collector
    pub delivered: u64,
    /// Lines that hit a transport error or a non-success status
    pub failed: u64,
    pub last_success: Option<Timestamp>,
    pub last_failure: Option<Timestamp>,
}

impl ForwardStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.record_success_at(Utc::now());
    }

    /// Record a delivery at a specific time
    pub fn record_success_at(&mut self, timestamp: Timestamp) {
        self.delivered += 1;
        self.last_success = Some(timestamp);
    }

    pub fn record_failure(&mut self) {
        self.record_failure_at(Utc::now());
    }

    /// Record a failed delivery at a specific time
    pub fn record_failure_at(&mut self, timestamp: Timestamp) {
        self.failed += 1;
        self.last_failure = Some(timestamp);
    }

    /// Total number of lines handed to the forwarder
    pub fn attempted(&self) -> u64 {
        self.delivered + self.failed
    }

    /// Share of attempts that were delivered, as a percentage (0-100)
    ///
    /// Returns 100 when nothing has been attempted yet.
    pub fn success_rate(&self) -> f64 {
        match self.attempted() {
            0 => 100.0,
            total => self.delivered as f64 / total as f64 * 100.0,
        }
    }
}
