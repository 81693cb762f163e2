//! Polling state machine
//!
//! Pure transition logic for a tracked job. `transition` takes the current
//! session state and one poll event and returns the next state plus the
//! effects the driver has to carry out, in order. It never performs I/O,
//! which keeps every rule here testable without a network or a clock.

use std::time::Duration;

use crate::domain::status::{RedirectParams, Status, StatusSnapshot};
use crate::view::ViewModel;

/// Delay before leaving a page whose job id was rejected locally
pub const INVALID_REQUEST_REDIRECT_DELAY: Duration = Duration::from_millis(2000);

/// Delay before leaving after a completion that carried no redirect data
pub const DEGRADED_COMPLETION_REDIRECT_DELAY: Duration = Duration::from_millis(2000);

/// Delay before leaving after a server, domain or transport failure
pub const FAILURE_REDIRECT_DELAY: Duration = Duration::from_millis(3000);

const INVALID_REQUEST_TEXT: &str = "Invalid request ID. Redirecting to home...";
const MISSING_REDIRECT_TEXT: &str =
    "Request completed, but redirect data missing. Redirecting to home...";
const TRANSPORT_FAILURE_TEXT: &str = "Failed to connect to server. Please try again.";

/// How a finished session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Job completed and the results view can be opened
    Completed,
    /// Job completed but the server sent no usable redirect data
    CompletedWithoutRedirect,
    Failed,
    Cancelled,
    /// The status endpoint reported a hard error
    ServerError,
    /// Network, timeout, HTTP status or decoding failure
    TransportError,
    /// The job id was missing or malformed; nothing was ever polled
    InvalidRequest,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Still polling; carries the last decoded non-terminal status
    Active(Status),
    /// Polling has stopped for good
    Finished(Outcome),
}

/// A single input to the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// The status endpoint answered with a decodable body
    Snapshot(StatusSnapshot),
    /// The status request failed; the detail is for logs only
    TransportFailure(String),
}

/// Navigation target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Home,
    Results(RedirectParams),
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Cancel the repeating poll timer
    StopPolling,
    /// Show this view
    Render(ViewModel),
    /// Tell the server the client is still waiting; fire-and-forget
    SendHeartbeat(Status),
    /// Leave now
    Navigate(Destination),
    /// Leave after a grace period
    ScheduleRedirect {
        destination: Destination,
        after: Duration,
    },
}

/// Mutable state of one poll session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    /// Last status a heartbeat was sent for
    pub last_observed: Option<Status>,
    /// Animation counter in `0..=3`
    pub dot_phase: u8,
    pub view: ViewModel,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Active(Status::Unknown),
            last_observed: None,
            dot_phase: 0,
            view: ViewModel::default(),
        }
    }
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Finished(outcome) => Some(outcome),
            Phase::Active(_) => None,
        }
    }

    /// Terminal state for a job id that failed local validation
    ///
    /// No timer was ever started, so no `StopPolling` is emitted.
    pub fn rejected() -> (Self, Vec<Effect>) {
        let state = Self {
            phase: Phase::Finished(Outcome::InvalidRequest),
            view: ViewModel {
                status_text: INVALID_REQUEST_TEXT.to_string(),
                ..ViewModel::default()
            },
            ..Self::default()
        };

        let effects = vec![
            Effect::Render(state.view.clone()),
            Effect::ScheduleRedirect {
                destination: Destination::Home,
                after: INVALID_REQUEST_REDIRECT_DELAY,
            },
        ];
        (state, effects)
    }
}

/// Compute the next state and effects for one event
///
/// Events arriving after the session finished are ignored.
pub fn transition(state: &SessionState, event: &PollEvent) -> (SessionState, Vec<Effect>) {
    if state.is_terminal() {
        return (state.clone(), Vec::new());
    }

    let mut next = state.clone();
    let effects = match event {
        PollEvent::TransportFailure(_) => {
            next.view.status_text = TRANSPORT_FAILURE_TEXT.to_string();
            fail(&mut next, Outcome::TransportError)
        }
        PollEvent::Snapshot(snapshot) => match snapshot.hard_error() {
            Some(error) => {
                next.view.status_text = format!("Error: {}", error);
                fail(&mut next, Outcome::ServerError)
            }
            None => on_snapshot(&mut next, snapshot),
        },
    };

    (next, effects)
}

fn on_snapshot(next: &mut SessionState, snapshot: &StatusSnapshot) -> Vec<Effect> {
    let status = snapshot.status;

    if status.is_active() {
        next.dot_phase = (next.dot_phase + 1) % 4;
    }
    next.view.apply_snapshot(snapshot, next.dot_phase);

    match status {
        Status::Completed => {
            next.view.spinner_visible = false;
            match snapshot.redirect() {
                Some(params) => {
                    next.phase = Phase::Finished(Outcome::Completed);
                    vec![
                        Effect::StopPolling,
                        Effect::Render(next.view.clone()),
                        Effect::Navigate(Destination::Results(params.clone())),
                    ]
                }
                None => {
                    next.phase = Phase::Finished(Outcome::CompletedWithoutRedirect);
                    next.view.status_text = MISSING_REDIRECT_TEXT.to_string();
                    vec![
                        Effect::StopPolling,
                        Effect::Render(next.view.clone()),
                        Effect::ScheduleRedirect {
                            destination: Destination::Home,
                            after: DEGRADED_COMPLETION_REDIRECT_DELAY,
                        },
                    ]
                }
            }
        }
        Status::Failed | Status::Cancelled => {
            if let Some(detail) = snapshot.failure_detail() {
                next.view.status_text = format!("Error: {}", detail);
            }
            let outcome = if status == Status::Failed {
                Outcome::Failed
            } else {
                Outcome::Cancelled
            };
            fail(next, outcome)
        }
        Status::Pending | Status::Processing | Status::Unknown => {
            next.phase = Phase::Active(status);
            let mut effects = vec![Effect::Render(next.view.clone())];
            if status.is_active() && next.last_observed != Some(status) {
                next.last_observed = Some(status);
                effects.push(Effect::SendHeartbeat(status));
            }
            effects
        }
    }
}

/// Shared tail of every failure path: stop, show home control, leave later
fn fail(next: &mut SessionState, outcome: Outcome) -> Vec<Effect> {
    next.phase = Phase::Finished(outcome);
    next.view.spinner_visible = false;
    next.view.home_visible = true;

    vec![
        Effect::StopPolling,
        Effect::Render(next.view.clone()),
        Effect::ScheduleRedirect {
            destination: Destination::Home,
            after: FAILURE_REDIRECT_DELAY,
        },
    ]
}
