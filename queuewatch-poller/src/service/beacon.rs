//! Cancellation beacon
//!
//! Sent once when the user abandons a job that is still being tracked.
//! Sending never blocks and never reports back; whether the service received
//! it is not observable.

use queuewatch_core::RequestId;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::repository::StatusRepository;

/// Best-effort abandonment signal
pub trait CancelBeacon: Send + Sync {
    /// Fire the beacon for `request_id`; returns immediately
    fn send(&self, request_id: &RequestId);
}

/// Beacon that cancels through the repository on a detached task
pub struct DetachedBeacon {
    repository: Arc<dyn StatusRepository>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl DetachedBeacon {
    pub fn new(repository: Arc<dyn StatusRepository>) -> Self {
        Self {
            repository,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Give outstanding beacons up to `grace` to finish
    ///
    /// Called by the process right before it exits. Beacons still running
    /// after the grace period are abandoned.
    pub async fn settle(&self, grace: Duration) {
        let handles: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        let deadline = Instant::now() + grace;

        for handle in handles {
            if time::timeout_at(deadline, handle).await.is_err() {
                debug!("Cancellation beacon still in flight after {:?}", grace);
                return;
            }
        }
    }
}

impl CancelBeacon for DetachedBeacon {
    fn send(&self, request_id: &RequestId) {
        let repository = Arc::clone(&self.repository);
        let request_id = request_id.clone();

        let handle = tokio::spawn(async move {
            debug!("Sending cancellation beacon for request {}", request_id);
            if let Err(e) = repository.cancel(&request_id).await {
                warn!("Cancellation beacon failed: {:#}", e);
            }
        });

        self.pending.lock().unwrap().push(handle);
    }
}
