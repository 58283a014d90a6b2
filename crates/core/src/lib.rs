//! # spot-map-core
//!
//! Domain model and data access for a map of location-tagged photos.
//!
//! - **Storage**: spots live in SQLite and are observed as a live list
//! - **Location**: one-shot fixes plus a fan-out feed of live updates
//! - **Capture**: camera failures are values, not panics, so the UI can
//!   explain exactly what went wrong

pub mod error;
pub mod location;
pub mod model;
pub mod repository;
pub mod store;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

pub mod prelude {
    pub use crate::error::{Result, SpotError};
    pub use crate::location::LocationFeed;
    pub use crate::model::*;
    pub use crate::repository::*;
    pub use crate::store::SpotStore;
}
