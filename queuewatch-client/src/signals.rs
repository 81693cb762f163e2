//! Liveness and cancellation signals
//!
//! Both endpoints are fire-and-forget from the caller's point of view. The
//! methods still report failures so callers can log them.

use crate::QueueClient;
use crate::error::Result;
use queuewatch_core::RequestId;
use tracing::debug;

impl QueueClient {
    // =============================================================================
    // Heartbeat
    // =============================================================================

    /// Tell the queue service someone is still waiting on a job
    ///
    /// # Arguments
    /// * `request_id` - The job identifier
    pub async fn send_heartbeat(&self, request_id: &RequestId) -> Result<()> {
        let url = format!("{}/queue_heartbeat/{}", self.base_url, request_id);
        debug!("POST {}", url);

        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Cancellation
    // =============================================================================

    /// Ask the queue service to drop a job the user walked away from
    ///
    /// The response carries no information the caller can act on.
    ///
    /// # Arguments
    /// * `request_id` - The job identifier
    pub async fn send_cancel_beacon(&self, request_id: &RequestId) -> Result<()> {
        let url = format!("{}/cancel_request_beacon/{}", self.base_url, request_id);
        debug!("POST {}", url);

        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
