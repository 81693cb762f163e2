//! Queuewatch HTTP Client
//!
//! A small, type-safe HTTP client for the queue service that holds a
//! previously submitted job.
//!
//! The client covers the three endpoints a waiting page needs:
//! - `GET /queue_status/{id}` to read the job's current status
//! - `POST /queue_heartbeat/{id}` to report that someone is still waiting
//! - `POST /cancel_request_beacon/{id}` to abandon the job
//!
//! # Example
//!
//! ```no_run
//! use queuewatch_client::QueueClient;
//! use queuewatch_core::RequestId;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = QueueClient::new("http://localhost:5000");
//!     let id: RequestId = "abc123".parse()?;
//!
//!     let snapshot = client.fetch_status(&id).await?;
//!     println!("Job {} is {}", id, snapshot.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod signals;
mod status;

pub use error::{ClientError, Result};
pub use queuewatch_core::StatusSnapshot;

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the queue service
#[derive(Debug, Clone)]
pub struct QueueClient {
    /// Base URL of the service (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl QueueClient {
    /// Create a new queue client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the queue service (e.g., "http://localhost:5000")
    ///
    /// # Example
    /// ```
    /// use queuewatch_client::QueueClient;
    ///
    /// let client = QueueClient::new("http://localhost:5000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new queue client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the queue service
    /// * `client` - A configured reqwest Client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a queue client whose every request is bounded by `timeout`
    ///
    /// # Example
    /// ```
    /// use queuewatch_client::QueueClient;
    /// use std::time::Duration;
    ///
    /// let client = QueueClient::with_timeout("http://localhost:5000", Duration::from_secs(10)).unwrap();
    /// assert_eq!(client.base_url(), "http://localhost:5000");
    /// ```
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(base_url, client))
    }

    /// Get the base URL of the queue service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success statuses become `ApiError`; bodies that are not the
    /// expected JSON become `ParseError`.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is ignored
    ///
    /// This method checks the status code and returns an error if the request failed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
