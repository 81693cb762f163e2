//! Queuewatch
//!
//! Waits on a previously submitted job in a remote queue and follows it to
//! the end.
//!
//! Architecture:
//! - Configuration: command-line flags with environment fallbacks
//! - Repositories: HTTP communication with the queue service
//! - Services: rendering, navigation and the cancellation beacon
//! - Scheduler: the poll loop driving the session's state machine
//!
//! The poller reads the job's status every few seconds, renders progress,
//! and once the job is done announces where the user goes next. Pressing
//! Ctrl+C while the job is still queued cancels it on the server.

mod config;
mod repository;
mod scheduler;
mod service;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use queuewatch_client::QueueClient;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, OutputFormat};
use crate::repository::{HttpStatusRepository, StatusRepository};
use crate::scheduler::{QueuePoller, RunOutcome};
use crate::service::{
    DetachedBeacon, JsonRenderer, Renderer, Routes, Sinks, TerminalNavigator, TerminalRenderer,
};

/// Exit code used when the user interrupts the wait
const EXIT_ABANDONED: u8 = 130;

#[derive(Parser)]
#[command(name = "queuewatch")]
#[command(about = "Follow a queued request until it finishes", long_about = None)]
struct Cli {
    /// Identifier of the request to follow
    #[arg(env = "QUEUEWATCH_REQUEST_ID")]
    request_id: Option<String>,

    /// Queue service URL
    #[arg(
        long,
        env = "QUEUEWATCH_SERVER_URL",
        default_value = "http://localhost:5000"
    )]
    server_url: String,

    /// Milliseconds between status polls
    #[arg(long, env = "QUEUEWATCH_POLL_INTERVAL_MS", default_value_t = 3000)]
    poll_interval_ms: u64,

    /// Milliseconds before a single HTTP request is abandoned
    #[arg(long, env = "QUEUEWATCH_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    request_timeout_ms: u64,

    /// Path of the home view
    #[arg(long, env = "QUEUEWATCH_HOME_PATH", default_value = "/")]
    home_path: String,

    /// Path of the results view
    #[arg(long, env = "QUEUEWATCH_RESULTS_PATH", default_value = "/show_results")]
    results_path: String,

    /// Milliseconds a cancellation beacon may keep the process alive
    #[arg(long, env = "QUEUEWATCH_BEACON_GRACE_MS", default_value_t = 250)]
    beacon_grace_ms: u64,

    /// Output format for status updates
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            home_path: self.home_path,
            results_path: self.results_path,
            beacon_grace: Duration::from_millis(self.beacon_grace_ms),
            output: self.output,
            ..Config::new(self.server_url, self.request_id)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so they never interleave with rendered status lines
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "queuewatch_poller=info,queuewatch_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Cli::parse().into_config();
    config.validate()?;
    info!(
        "Loaded configuration: server_url={}, poll_interval={:?}, request_timeout={:?}",
        config.server_url, config.poll_interval, config.request_timeout
    );

    let client = QueueClient::with_timeout(config.server_url.clone(), config.request_timeout)
        .context("Failed to initialize queue client")?;
    let repository: Arc<dyn StatusRepository> = Arc::new(HttpStatusRepository::new(client));

    let routes = Routes::new(&config.server_url, &config.home_path, &config.results_path)?;
    let beacon = Arc::new(DetachedBeacon::new(Arc::clone(&repository)));
    let renderer: Arc<dyn Renderer> = match config.output {
        OutputFormat::Text => Arc::new(TerminalRenderer::new()),
        OutputFormat::Json => Arc::new(JsonRenderer),
    };
    let sinks = Sinks {
        renderer,
        navigator: Arc::new(TerminalNavigator::new(config.output)),
        beacon: beacon.clone(),
    };

    let poller = QueuePoller::new(&config, repository, routes, sinks);

    let abandon = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl+C, abandonment disabled: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let outcome = poller.run(config.request_id.as_deref(), abandon).await?;

    match outcome {
        RunOutcome::Abandoned => {
            beacon.settle(config.beacon_grace).await;
            Ok(ExitCode::from(EXIT_ABANDONED))
        }
        RunOutcome::Finished { outcome, .. } if outcome.is_success() => Ok(ExitCode::SUCCESS),
        RunOutcome::Finished { .. } => Ok(ExitCode::FAILURE),
    }
}
