//! Core data types for spots and the platform values that produce them.

use crate::error::{Result, SpotError};

/// A persisted photo pinned to the place it was taken.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct Spot {
    pub id: i64,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_uri: String,
    /// Milliseconds since the unix epoch
    pub created_at_ms: i64,
}

/// A spot that has not been written to storage yet
#[derive(Clone, Debug, PartialEq)]
pub struct NewSpot {
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_uri: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl UserLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reject coordinates a map cannot place.
    ///
    /// NaN and infinities fail the range checks as well.
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SpotError::InvalidCoordinates(format!(
                "Latitud fuera de rango: {}",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SpotError::InvalidCoordinates(format!(
                "Longitud fuera de rango: {}",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Opaque handle to the platform's capture session.
///
/// The core never looks inside; it is handed back to the camera as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct CaptureHandle {
    pub token: String,
}

impl CaptureHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum CameraCaptureError {
    CameraClosed,
    HardwareError,
    StorageError,
    Unknown,
}

/// Outcome of a spot creation attempt
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum CreateSpotResult {
    Success,
    NoLocation,
    InvalidCoordinates { message: String },
    PhotoCaptureFailed { error: CameraCaptureError },
}
