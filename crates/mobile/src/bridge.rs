//! Traits the native app implements, and their adapters onto the core.

use std::sync::Arc;

use async_trait::async_trait;
use spot_map_core::error::{Result, SpotError};
use spot_map_core::model::{CameraCaptureError, CaptureHandle, UserLocation};
use spot_map_core::repository::{CameraCapture, CurrentLocation};

use crate::state::view::frame::{CameraTarget, MapFrame};

/// Called from runtime threads; implementations post to their UI thread.
#[uniffi::export(with_foreign)]
pub trait MapSurface: Send + Sync {
    fn render(&self, frame: MapFrame);

    fn animate_camera(&self, target: CameraTarget);

    /// One-shot transient notification (toast / snackbar)
    fn show_message(&self, message: String);

    fn capture_finished(&self, success: bool);
}

#[uniffi::export(with_foreign)]
pub trait Navigator: Send + Sync {
    fn navigate_to_capture(&self);
}

/// Must return immediately; the platform loader does the work.
#[uniffi::export(with_foreign)]
pub trait ImagePrefetcher: Send + Sync {
    fn prefetch(&self, image_uri: String);
}

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ServiceError {
    #[error("{message}")]
    Unavailable { message: String },
    #[error("{message}")]
    Failed { message: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for ServiceError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Failed {
            message: error.reason,
        }
    }
}

impl From<ServiceError> for SpotError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Unavailable { .. } => SpotError::LocationUnavailable,
            ServiceError::Failed { message } => SpotError::Fault(message),
        }
    }
}

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum CaptureFailure {
    #[error("camera closed")]
    CameraClosed,
    #[error("camera hardware error")]
    HardwareError,
    #[error("could not store photo")]
    StorageError,
    #[error("{reason}")]
    Unknown { reason: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for CaptureFailure {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Unknown {
            reason: error.reason,
        }
    }
}

impl From<CaptureFailure> for CameraCaptureError {
    fn from(failure: CaptureFailure) -> Self {
        match failure {
            CaptureFailure::CameraClosed => CameraCaptureError::CameraClosed,
            CaptureFailure::HardwareError => CameraCaptureError::HardwareError,
            CaptureFailure::StorageError => CameraCaptureError::StorageError,
            CaptureFailure::Unknown { reason } => {
                tracing::debug!(%reason, "unclassified capture failure");
                CameraCaptureError::Unknown
            }
        }
    }
}

#[uniffi::export(with_foreign)]
#[async_trait]
pub trait ForeignLocationProvider: Send + Sync {
    async fn current_location(&self) -> std::result::Result<Option<UserLocation>, ServiceError>;
}

#[uniffi::export(with_foreign)]
#[async_trait]
pub trait ForeignCamera: Send + Sync {
    /// Returns the uri the photo was written to.
    async fn capture(&self, handle: CaptureHandle) -> std::result::Result<String, CaptureFailure>;
}

pub(crate) struct PlatformLocation(pub Arc<dyn ForeignLocationProvider>);

#[async_trait]
impl CurrentLocation for PlatformLocation {
    async fn fetch(&self) -> Result<Option<UserLocation>> {
        Ok(self.0.current_location().await?)
    }
}

pub(crate) struct PlatformCamera(pub Arc<dyn ForeignCamera>);

#[async_trait]
impl CameraCapture for PlatformCamera {
    async fn capture(
        &self,
        handle: &CaptureHandle,
    ) -> std::result::Result<String, CameraCaptureError> {
        Ok(self.0.capture(handle.clone()).await?)
    }
}
