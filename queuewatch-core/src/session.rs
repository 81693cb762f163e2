//! Poll session
//!
//! One session per tracked job. The session owns the machine state and the
//! validated job id; the driver owns the timer and interprets the effects the
//! session hands back.

use crate::domain::request::{InvalidRequestId, RequestId};
use crate::machine::{Effect, Outcome, PollEvent, SessionState, transition};
use crate::view::ViewModel;

#[derive(Debug, Clone)]
pub struct PollSession {
    request_id: Option<RequestId>,
    rejection: Option<InvalidRequestId>,
    state: SessionState,
}

impl PollSession {
    /// Start a session from a raw, possibly missing job id
    ///
    /// A rejected id yields a session that is already finished and whose
    /// effects only render the error and schedule the way home.
    pub fn start(raw_request_id: Option<&str>) -> (Self, Vec<Effect>) {
        match RequestId::parse(raw_request_id) {
            Ok(request_id) => {
                let state = SessionState::default();
                let effects = vec![Effect::Render(state.view.clone())];
                let session = Self {
                    request_id: Some(request_id),
                    rejection: None,
                    state,
                };
                (session, effects)
            }
            Err(reason) => {
                let (state, effects) = SessionState::rejected();
                let session = Self {
                    request_id: None,
                    rejection: Some(reason),
                    state,
                };
                (session, effects)
            }
        }
    }

    /// Feed one poll result through the machine
    pub fn apply(&mut self, event: &PollEvent) -> Vec<Effect> {
        let (next, effects) = transition(&self.state, event);
        self.state = next;
        effects
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Why the job id was rejected, if it was
    pub fn rejection(&self) -> Option<&InvalidRequestId> {
        self.rejection.as_ref()
    }

    /// True while a valid job is being polled
    pub fn is_tracking(&self) -> bool {
        self.request_id.is_some() && !self.state.is_terminal()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> &ViewModel {
        &self.state.view
    }
}
