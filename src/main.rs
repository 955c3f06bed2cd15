use anyhow::Context;
use clap::Parser;
use journal_relay::config::Config;
use journal_relay::error::ConfigError;
use journal_relay::forwarder::HttpSink;
use journal_relay::JournalWatcher;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::mpsc;

/// Command-line arguments for the journal relay
#[derive(Parser)]
#[command(
    name = "journal-relay",
    about = "Tails the active game journal and forwards the latest matching event",
    long_about = "Watches a directory of rotating journal files, follows whichever file was \
                  modified most recently, and POSTs the newest line carrying the configured \
                  marker token to a collector endpoint on every poll cycle."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,

    /// Override the journal directory
    #[arg(long, value_name = "DIR")]
    journal_dir: Option<PathBuf>,

    /// Override the collector endpoint
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            // Missing files fall back to defaults in load_config
            if config_path.exists() {
                if !config_path.is_file() {
                    return Err(format!(
                        "Configuration path is not a file: {}",
                        config_path.display()
                    ));
                }

                if let Some(extension) = config_path.extension() {
                    if extension != "toml" {
                        warn!(
                            "Configuration file does not have .toml extension: {}",
                            config_path.display()
                        );
                    }
                }
            }
        }

        if let Some(ref dir) = self.journal_dir {
            if dir.as_os_str().is_empty() {
                return Err("Journal directory must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Apply command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.journal_dir {
            config.watcher.journal_dir = Some(dir.clone());
        }
        if let Some(ref endpoint) = self.endpoint {
            config.forwarder.endpoint = endpoint.clone();
        }
        config.validate()
    }
}

/// Load configuration from file or use defaults
///
/// A missing or unreadable file and an invalid file both fall back to the
/// defaults, with a warning or an error logged respectively.
fn load_config(config_path: Option<&PathBuf>) -> Config {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            match Config::from_file(path) {
                Ok(config) => config,
                Err(ConfigError::ReadError(_)) => {
                    warn!(
                        "Configuration file '{}' not found or unreadable, using defaults",
                        path.display()
                    );
                    Config::default()
                }
                Err(e) => {
                    error!("Configuration error in '{}': {}", path.display(), e);
                    warn!("Using default configuration due to invalid config file");
                    Config::default()
                }
            }
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_ref());
    cli.apply_overrides(&mut config)
        .context("Invalid command-line override")?;

    let sink = HttpSink::new(&config.forwarder).context("Failed to create HTTP forwarder")?;
    info!("Forwarding matches to {}", sink.endpoint());

    let mut watcher = JournalWatcher::new(&config.watcher, sink);
    info!("Journal directory: {}", watcher.journal_dir().display());

    if cli.once {
        let outcome = watcher.poll_once();
        info!("Single poll finished: {:?}", outcome);
    } else {
        let (shutdown_sender, shutdown_receiver) = mpsc::channel();
        ctrlc::set_handler(move || {
            info!("Received interrupt signal (SIGINT), shutting down gracefully...");
            if let Err(e) = shutdown_sender.send(()) {
                error!("Failed to send shutdown signal: {}", e);
            }
        })
        .context("Error setting SIGINT handler")?;

        info!("Journal relay is running. Press Ctrl+C to stop.");
        watcher.run(&shutdown_receiver);
    }

    log_summary(watcher.sink());
    Ok(())
}

fn log_summary(sink: &HttpSink) {
    let stats = sink.stats();
    info!(
        "Forwarded {} line(s): {} delivered, {} failed ({:.1}% success)",
        stats.attempted(),
        stats.delivered,
        stats.failed,
        stats.success_rate()
    );
    if let Some(last) = stats.last_failure {
        info!("Last failed delivery at {}", last.to_rfc3339());
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    } else if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    info!("Starting journal relay");

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    info!("Journal relay shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> Cli {
        Cli {
            config: None,
            verbose: false,
            journal_dir: None,
            endpoint: None,
            once: false,
        }
    }

    #[test]
    fn test_cli_validation_with_existing_file() {
        let temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(temp_file.path(), "[watcher]\nmarker = \"Docked\"").unwrap();

        let cli = Cli {
            config: Some(temp_file.path().to_path_buf()),
            ..cli()
        };

        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_missing_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/relay.toml")),
            ..cli()
        };

        // Missing files are handled by falling back to defaults
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = Cli {
            config: Some(dir.path().to_path_buf()),
            ..cli()
        };

        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_cli_validation_no_config() {
        assert!(cli().validate().is_ok());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli {
            journal_dir: Some(PathBuf::from("/srv/journals")),
            endpoint: Some("http://127.0.0.1:9000/api/save".to_string()),
            ..cli()
        };

        let mut config = Config::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(
            config.watcher.resolved_journal_dir(),
            PathBuf::from("/srv/journals")
        );
        assert_eq!(config.forwarder.endpoint, "http://127.0.0.1:9000/api/save");
    }

    #[test]
    fn test_invalid_endpoint_override_rejected() {
        let cli = Cli {
            endpoint: Some("localhost:8000".to_string()),
            ..cli()
        };

        let mut config = Config::default();
        assert!(cli.apply_overrides(&mut config).is_err());
    }

    #[test]
    fn test_load_config_falls_back_to_defaults() {
        assert_eq!(load_config(None), Config::default());
        assert_eq!(
            load_config(Some(&PathBuf::from("/nonexistent/relay.toml"))),
            Config::default()
        );

        let invalid = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(invalid.path(), "[watcher]\npoll_interval_seconds = 0\n").unwrap();
        assert_eq!(
            load_config(Some(&invalid.path().to_path_buf())),
            Config::default()
        );
    }
}
