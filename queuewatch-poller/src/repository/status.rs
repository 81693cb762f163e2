//! Status repository
//!
//! Handles communication with the queue service for one tracked job:
//! - Fetching the job's status
//! - Sending heartbeats while the job is active
//! - Cancelling the job when the user walks away

use anyhow::{Context, Result};
use async_trait::async_trait;
use queuewatch_client::{ClientError, QueueClient};
use queuewatch_core::{RequestId, StatusSnapshot};
use tracing::debug;

/// Repository trait for job-status operations with the queue service
#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// Fetches the current status snapshot of a job
    ///
    /// Any error (network, timeout, HTTP status, undecodable body) is a
    /// transport failure from the poller's point of view.
    async fn fetch_status(&self, request_id: &RequestId) -> Result<StatusSnapshot>;

    /// Reports that the client is still waiting on the job
    async fn send_heartbeat(&self, request_id: &RequestId) -> Result<()>;

    /// Asks the service to drop the job
    async fn cancel(&self, request_id: &RequestId) -> Result<()>;
}

/// HTTP implementation of StatusRepository
pub struct HttpStatusRepository {
    client: QueueClient,
}

impl HttpStatusRepository {
    /// Creates a new HTTP status repository
    ///
    /// # Arguments
    /// * `client` - Client already configured with base URL and timeout
    pub fn new(client: QueueClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusRepository for HttpStatusRepository {
    async fn fetch_status(&self, request_id: &RequestId) -> Result<StatusSnapshot> {
        self.client
            .fetch_status(request_id)
            .await
            .inspect_err(|e| debug!("Status request for {} failed: {}", request_id, failure_class(e)))
            .with_context(|| format!("Failed to fetch status of request {}", request_id))
    }

    async fn send_heartbeat(&self, request_id: &RequestId) -> Result<()> {
        self.client
            .send_heartbeat(request_id)
            .await
            .inspect_err(|e| debug!("Heartbeat for {} failed: {}", request_id, failure_class(e)))
            .with_context(|| format!("Failed to send heartbeat for request {}", request_id))
    }

    async fn cancel(&self, request_id: &RequestId) -> Result<()> {
        self.client
            .send_cancel_beacon(request_id)
            .await
            .inspect_err(|e| debug!("Cancellation for {} failed: {}", request_id, failure_class(e)))
            .with_context(|| format!("Failed to cancel request {}", request_id))
    }
}

/// Short label for a client error, used in logs
fn failure_class(error: &ClientError) -> &'static str {
    if error.is_timeout() {
        "timed out"
    } else if error.is_not_found() {
        "request unknown to the service"
    } else if error.is_server_error() {
        "service error"
    } else if error.is_client_error() {
        "rejected by the service"
    } else if matches!(error, ClientError::ParseError(_)) {
        "unreadable response"
    } else {
        "service unreachable"
    }
}
