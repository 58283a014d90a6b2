use spot_map_core::model::{Spot, UserLocation};

/// Everything the native map screen draws, in one value.
#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct MapFrame {
    pub markers: Vec<MarkerModel>,
    pub detail: Option<DetailCard>,
    pub delete_prompt: Option<DeletePrompt>,
    pub show_progress: bool,
    pub show_capture_button: bool,
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct MarkerModel {
    pub spot_id: i64,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Spot> for MarkerModel {
    fn from(spot: &Spot) -> Self {
        Self {
            spot_id: spot.id,
            title: spot.title.clone(),
            latitude: spot.latitude,
            longitude: spot.longitude,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct DetailCard {
    pub spot_id: i64,
    pub title: String,
    pub coordinates: String,
    pub image_uri: String,
}

impl DetailCard {
    pub fn new(spot: &Spot, precision: u8) -> Self {
        Self {
            spot_id: spot.id,
            title: spot.title.clone(),
            coordinates: format_coordinates(spot.latitude, spot.longitude, precision),
            image_uri: spot.image_uri.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct DeletePrompt {
    pub spot_id: i64,
    pub title: String,
    pub message: String,
}

impl From<&Spot> for DeletePrompt {
    fn from(spot: &Spot) -> Self {
        Self {
            spot_id: spot.id,
            title: "Eliminar spot".to_owned(),
            message: format!("¿Seguro que quieres eliminar \"{}\"?", spot.title),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct CameraTarget {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f32,
}

impl CameraTarget {
    pub fn centered_on(location: UserLocation, zoom: f32) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            zoom,
        }
    }
}

pub fn format_coordinates(latitude: f64, longitude: f64, precision: u8) -> String {
    let precision = usize::from(precision);
    format!("{latitude:.precision$}, {longitude:.precision$}")
}
