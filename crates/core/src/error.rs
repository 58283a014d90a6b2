use crate::model::CameraCaptureError;

#[derive(Debug, thiserror::Error)]
pub enum SpotError {
    #[error("Location unavailable")]
    LocationUnavailable,

    #[error("{0}")]
    InvalidCoordinates(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(CameraCaptureError),

    #[error("Storage error: {0}")]
    Persistence(String),

    #[error("{0}")]
    Fault(String),
}

impl From<rusqlite::Error> for SpotError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Persistence(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpotError>;
