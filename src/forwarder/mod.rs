/// HTTP delivery of matched lines
pub mod http_sink;

/// Delivery counters for the forwarder
pub mod stats;

pub use http_sink::HttpSink;
pub use stats::ForwardStats;

/// Destination for matched journal lines
///
/// The watcher hands every matched line to a sink and moves on. A sink
/// reports its own failures (by logging) and never feeds them back into the
/// watcher's state.
#[cfg_attr(test, mockall::automock)]
pub trait Sink {
    fn forward(&mut self, line: &str);
}

/// Sink that keeps every forwarded line in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    lines: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines received so far, oldest first
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Sink for RecordingSink {
    fn forward(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
