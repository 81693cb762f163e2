//! Service layer
//!
//! Services are the poller's outward-facing capabilities: showing a view,
//! leaving for another page, and signalling abandonment. The state machine
//! decides when each is used; the services only carry it out.
//!
//! All services are trait-based to enable testing and dependency injection.

mod beacon;
mod navigation;
mod render;

use std::sync::Arc;

// Re-export traits
pub use beacon::CancelBeacon;
pub use navigation::Navigator;
pub use render::Renderer;

// Re-export implementations
pub use beacon::DetachedBeacon;
pub use navigation::{Routes, TerminalNavigator};
pub use render::{JsonRenderer, TerminalRenderer};

/// Everything a poller hands its effects to
#[derive(Clone)]
pub struct Sinks {
    pub renderer: Arc<dyn Renderer>,
    pub navigator: Arc<dyn Navigator>,
    pub beacon: Arc<dyn CancelBeacon>,
}
