//! Repository layer
//!
//! Repositories are stateless HTTP adapters that abstract communication
//! with the queue service. They carry no polling logic.
//!
//! All repositories are trait-based to enable testing and mocking.

mod status;

pub use status::{HttpStatusRepository, StatusRepository};
