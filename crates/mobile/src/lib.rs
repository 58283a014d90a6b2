//! # spot-map-mobile
//!
//! Presentation layer of the spot map, exported to Kotlin/Swift via uniffi.
//! Native code owns a [`SpotMapSession`], opens a [`MapScreen`] per map view
//! and renders the frames it receives.

pub mod bridge;
pub mod config;
mod logging;
pub mod scope;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use logging::{init_logging, init_panic_handler};
pub use session::{SessionError, SpotMapSession};
pub use state::view::MapScreen;
pub use state::view_model::MapViewModel;

uniffi::setup_scaffolding!();
