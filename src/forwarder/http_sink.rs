use crate::config::ForwarderConfig;
use crate::error::ForwardError;
use crate::forwarder::{ForwardStats, Sink};
use log::{error, info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::runtime::Runtime;

/// Sink that POSTs each line to the collector
///
/// The raw line is sent as the request body. There is no retry and no
/// queue: a failed send is logged and counted, and the next poll cycle
/// proceeds as usual. Requests are driven on a private current-thread
/// runtime so the watcher loop stays strictly sequential.
pub struct HttpSink {
    client: Client,
    runtime: Runtime,
    endpoint: String,
    content_type: String,
    echo_lines: bool,
    stats: ForwardStats,
}

impl HttpSink {
    /// Build a sink from forwarder settings
    ///
    /// # Errors
    ///
    /// Returns `ForwardError::HttpError` if the HTTP client cannot be built and
    /// `ForwardError::RuntimeError` if the async runtime cannot be started.
    pub fn new(config: &ForwarderConfig) -> Result<Self, ForwardError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let client = {
            let _guard = runtime.enter();
            Client::builder()
                .timeout(config.timeout())
                .no_proxy()
                .build()?
        };

        Ok(Self {
            client,
            runtime,
            endpoint: config.endpoint.clone(),
            content_type: config.content_type.clone(),
            echo_lines: config.echo_lines,
            stats: ForwardStats::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn stats(&self) -> &ForwardStats {
        &self.stats
    }

    /// Send one line and wait for the response
    ///
    /// # Errors
    ///
    /// Returns `ForwardError::HttpError` on transport failure or timeout and
    /// `ForwardError::UnexpectedStatus` if the collector does not answer
    /// with a success status.
    pub fn send(&self, line: &str) -> Result<(), ForwardError> {
        self.runtime.block_on(async {
            let response = self
                .client
                .post(&self.endpoint)
                .header(CONTENT_TYPE, self.content_type.as_str())
                .body(line.to_owned())
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(ForwardError::UnexpectedStatus(status));
            }
            Ok::<(), ForwardError>(())
        })
    }
}

impl Sink for HttpSink {
    fn forward(&mut self, line: &str) {
        if self.echo_lines {
            println!("{}", line);
        }

        match self.send(line) {
            Ok(()) => {
                self.stats.record_success();
                info!("Forwarded line to {}", self.endpoint);
            }
            Err(ForwardError::UnexpectedStatus(status)) => {
                self.stats.record_failure();
                warn!("Collector at {} responded with {}", self.endpoint, status);
            }
            Err(e) => {
                self.stats.record_failure();
                error!("Send error: {}", e);
            }
        }
    }
}
