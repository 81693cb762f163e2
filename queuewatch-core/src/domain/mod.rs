//! Core domain types
//!
//! Structures shared between the HTTP client (decodes them) and the poller
//! (drives the state machine with them).

pub mod request;
pub mod status;
