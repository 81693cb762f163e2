//! Scheduler layer for the poller
//!
//! This layer owns the poll timer and the session for one tracked job, and
//! turns the session's effects into calls on the repository and services.

pub mod poller;

pub use poller::{QueuePoller, RunOutcome};
