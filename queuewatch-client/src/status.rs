//! Status endpoint

use crate::QueueClient;
use crate::error::Result;
use queuewatch_core::{RequestId, StatusSnapshot};
use tracing::debug;

impl QueueClient {
    // =============================================================================
    // Job Status
    // =============================================================================

    /// Fetch the current status of a job
    ///
    /// # Arguments
    /// * `request_id` - The job identifier
    ///
    /// # Returns
    /// The decoded snapshot. Optional fields that are absent or null decode
    /// to `None`; a missing or unrecognized status decodes to `Unknown`.
    ///
    /// # Example
    /// ```no_run
    /// # use queuewatch_client::QueueClient;
    /// # use queuewatch_core::RequestId;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = QueueClient::new("http://localhost:5000");
    /// let id: RequestId = "abc123".parse()?;
    /// let snapshot = client.fetch_status(&id).await?;
    /// if let Some(position) = snapshot.position {
    ///     println!("Position {}", position);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_status(&self, request_id: &RequestId) -> Result<StatusSnapshot> {
        let url = format!("{}/queue_status/{}", self.base_url, request_id);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
