//! Queuewatch Core
//!
//! Core types and the polling state machine for the queuewatch client.
//!
//! This crate contains:
//! - Domain types: the job identifier, server statuses and status snapshots
//! - View model: what the presentation layer is asked to show
//! - Machine: the pure transition function and the effects it emits
//! - Session: one tracked job and its evolving machine state
//!
//! Nothing in here performs I/O. The poller binary interprets effects.

pub mod domain;
pub mod machine;
pub mod session;
pub mod view;

pub use domain::request::{InvalidRequestId, RequestId};
pub use domain::status::{RedirectParams, Status, StatusSnapshot};
pub use machine::{Destination, Effect, Outcome, Phase, PollEvent, SessionState, transition};
pub use session::PollSession;
pub use view::{ProgressStyle, ViewModel};
