//! Navigation
//!
//! `Routes` maps a destination chosen by the state machine to a concrete URL
//! on the queue service's site. A `Navigator` takes the user there; in a
//! terminal that means announcing the URL and ending the run.

use anyhow::{Context, Result};
use colored::*;
use queuewatch_core::Destination;
use reqwest::Url;
use tracing::info;

use crate::config::OutputFormat;

/// Leaves the waiting view for another page
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &Url);
}

/// Home and results locations on the queue service's site
#[derive(Debug, Clone)]
pub struct Routes {
    home: Url,
    results: Url,
}

impl Routes {
    /// Resolve both view paths against the service base URL
    pub fn new(server_url: &str, home_path: &str, results_path: &str) -> Result<Self> {
        let base = Url::parse(server_url)
            .with_context(|| format!("Invalid server URL: {}", server_url))?;
        let home = base
            .join(home_path)
            .with_context(|| format!("Invalid home path: {}", home_path))?;
        let results = base
            .join(results_path)
            .with_context(|| format!("Invalid results path: {}", results_path))?;

        Ok(Self { home, results })
    }

    /// URL for a destination
    ///
    /// The results URL carries exactly `request_id`, `train_name` and `date`.
    pub fn url_for(&self, destination: &Destination) -> Url {
        match destination {
            Destination::Home => self.home.clone(),
            Destination::Results(params) => {
                let mut url = self.results.clone();
                url.query_pairs_mut()
                    .clear()
                    .append_pair("request_id", &params.request_id)
                    .append_pair("train_name", &params.train_name)
                    .append_pair("date", &params.date);
                url
            }
        }
    }
}

/// Announces the navigation target on stdout
#[derive(Debug)]
pub struct TerminalNavigator {
    output: OutputFormat,
}

impl TerminalNavigator {
    pub fn new(output: OutputFormat) -> Self {
        Self { output }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, url: &Url) {
        info!("Navigating to {}", url);

        match self.output {
            OutputFormat::Text => println!("{} {}", "Navigating to".bold(), url.as_str().cyan()),
            OutputFormat::Json => println!("{}", serde_json::json!({ "navigate": url.as_str() })),
        }
    }
}
