//! In-memory doubles for the repository and service traits

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use queuewatch_core::{RedirectParams, RequestId, Status, StatusSnapshot, ViewModel};
use reqwest::Url;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{self, Instant};

use crate::repository::StatusRepository;
use crate::service::{CancelBeacon, Navigator, Renderer};

/// Repository that answers status polls from a script
///
/// Once the script runs out every poll answers `pending`.
pub struct ScriptedRepository {
    script: Mutex<VecDeque<Result<StatusSnapshot, String>>>,
    status_delay: Duration,
    signal_delay: Duration,
    fail_signals: bool,
    polls: Mutex<Vec<Instant>>,
    heartbeats: Mutex<Vec<RequestId>>,
    cancels: Mutex<Vec<RequestId>>,
}

impl ScriptedRepository {
    pub fn new(script: Vec<Result<StatusSnapshot, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            status_delay: Duration::ZERO,
            signal_delay: Duration::ZERO,
            fail_signals: false,
            polls: Mutex::new(Vec::new()),
            heartbeats: Mutex::new(Vec::new()),
            cancels: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn with_signal_delay(mut self, delay: Duration) -> Self {
        self.signal_delay = delay;
        self
    }

    /// Heartbeats and cancellations are recorded, then fail
    pub fn failing_signals(mut self) -> Self {
        self.fail_signals = true;
        self
    }

    /// Instants at which status polls were issued
    pub fn polls(&self) -> Vec<Instant> {
        self.polls.lock().unwrap().clone()
    }

    pub fn heartbeats(&self) -> Vec<RequestId> {
        self.heartbeats.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> Vec<RequestId> {
        self.cancels.lock().unwrap().clone()
    }

    async fn signal(&self, log: &Mutex<Vec<RequestId>>, request_id: &RequestId) -> Result<()> {
        time::sleep(self.signal_delay).await;
        log.lock().unwrap().push(request_id.clone());
        if self.fail_signals {
            return Err(anyhow!("service unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl StatusRepository for ScriptedRepository {
    async fn fetch_status(&self, _request_id: &RequestId) -> Result<StatusSnapshot> {
        self.polls.lock().unwrap().push(Instant::now());
        time::sleep(self.status_delay).await;

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(snapshot)) => Ok(snapshot),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(snapshot(Status::Pending)),
        }
    }

    async fn send_heartbeat(&self, request_id: &RequestId) -> Result<()> {
        self.signal(&self.heartbeats, request_id).await
    }

    async fn cancel(&self, request_id: &RequestId) -> Result<()> {
        self.signal(&self.cancels, request_id).await
    }
}

#[derive(Default)]
pub struct RecordingRenderer {
    views: Mutex<Vec<ViewModel>>,
}

impl RecordingRenderer {
    pub fn views(&self) -> Vec<ViewModel> {
        self.views.lock().unwrap().clone()
    }

    pub fn last(&self) -> ViewModel {
        self.views.lock().unwrap().last().cloned().unwrap()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, view: &ViewModel) {
        self.views.lock().unwrap().push(view.clone());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<(Url, Instant)>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<(Url, Instant)> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) {
        self.visits.lock().unwrap().push((url.clone(), Instant::now()));
    }
}

#[derive(Default)]
pub struct RecordingBeacon {
    sent: Mutex<Vec<RequestId>>,
}

impl RecordingBeacon {
    pub fn sent(&self) -> Vec<RequestId> {
        self.sent.lock().unwrap().clone()
    }
}

impl CancelBeacon for RecordingBeacon {
    fn send(&self, request_id: &RequestId) {
        self.sent.lock().unwrap().push(request_id.clone());
    }
}

pub fn snapshot(status: Status) -> StatusSnapshot {
    StatusSnapshot::with_status(status)
}

pub fn completed_with_redirect() -> StatusSnapshot {
    StatusSnapshot {
        redirect_params: Some(RedirectParams {
            request_id: "abc123".to_string(),
            train_name: "Intercity Express".to_string(),
            date: "2025-06-01".to_string(),
        }),
        ..snapshot(Status::Completed)
    }
}
