//! User-facing text for every failure the state holder can surface.

use std::fmt::Display;

use spot_map_core::model::{CameraCaptureError, CreateSpotResult};

pub const LOCATION_ERROR_PREFIX: &str = "Error al obtener la ubicación";
pub const DELETE_ERROR_PREFIX: &str = "Error al eliminar el spot";
pub const UNEXPECTED_ERROR_PREFIX: &str = "Error inesperado";
pub const NO_LOCATION: &str = "No se pudo obtener la ubicación actual";

pub fn capture_error(error: CameraCaptureError) -> &'static str {
    match error {
        CameraCaptureError::CameraClosed => "La cámara se cerró inesperadamente",
        CameraCaptureError::HardwareError => "Error de hardware de la cámara",
        CameraCaptureError::StorageError => "Error de almacenamiento al guardar la foto",
        CameraCaptureError::Unknown => "Error desconocido al capturar la foto",
    }
}

/// `None` means the spot was created and there is nothing to report.
pub fn create_spot_failure(result: &CreateSpotResult) -> Option<String> {
    match result {
        CreateSpotResult::Success => None,
        CreateSpotResult::NoLocation => Some(NO_LOCATION.to_owned()),
        CreateSpotResult::InvalidCoordinates { message } => Some(message.clone()),
        CreateSpotResult::PhotoCaptureFailed { error } => Some(capture_error(*error).to_owned()),
    }
}

pub fn location_error(error: impl Display) -> String {
    format!("{LOCATION_ERROR_PREFIX}: {error}")
}

pub fn delete_error(error: impl Display) -> String {
    format!("{DELETE_ERROR_PREFIX}: {error}")
}

pub fn unexpected_error(error: impl Display) -> String {
    format!("{UNEXPECTED_ERROR_PREFIX}: {error}")
}
