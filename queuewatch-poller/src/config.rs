//! Poller configuration
//!
//! Defines all configurable parameters for the poller including the queue
//! service location, polling cadence, request timeout and navigation targets.

use clap::ValueEnum;
use std::time::Duration;

/// How rendered views are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, coloured status lines
    Text,
    /// One JSON object per line
    Json,
}

/// Poller configuration
///
/// Intervals and timeouts are configurable to allow tuning for different
/// deployments. Redirect grace periods are fixed by the session itself.
#[derive(Debug, Clone)]
pub struct Config {
    /// Queue service base URL (e.g., "http://localhost:5000")
    pub server_url: String,

    /// Job to track; a missing id is handled by the session, not rejected here
    pub request_id: Option<String>,

    /// How often to poll the status endpoint
    pub poll_interval: Duration,

    /// Upper bound for every HTTP request
    pub request_timeout: Duration,

    /// Path of the home view
    pub home_path: String,

    /// Path of the results view
    pub results_path: String,

    /// How long outstanding cancellation beacons may run before exit
    pub beacon_grace: Duration,

    pub output: OutputFormat,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(server_url: String, request_id: Option<String>) -> Self {
        Self {
            server_url,
            request_id,
            poll_interval: Duration::from_millis(3000),
            request_timeout: Duration::from_secs(10),
            home_path: "/".to_string(),
            results_path: "/show_results".to_string(),
            beacon_grace: Duration::from_millis(250),
            output: OutputFormat::Text,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_url.is_empty() {
            anyhow::bail!("server_url cannot be empty");
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            anyhow::bail!("server_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if !self.home_path.starts_with('/') {
            anyhow::bail!("home_path must start with /");
        }

        if !self.results_path.starts_with('/') {
            anyhow::bail!("results_path must start with /");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:5000".to_string(), None)
    }
}
