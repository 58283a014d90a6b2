/// Tunables for the map screen. The defaults match what the app ships with.
#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct ScreenConfig {
    /// How long the spot list keeps following storage after the last observer leaves
    pub spot_retention_ms: u64,
    /// Zoom used when the camera first centers on the user
    pub center_zoom: f32,
    /// Decimal places shown for coordinates on the detail card
    pub coordinate_precision: u8,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            spot_retention_ms: 5_000,
            center_zoom: 15.0,
            coordinate_precision: 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct SessionConfig {
    /// SQLite file for spots; `:memory:` keeps them in RAM
    pub database_path: String,
    pub screen: ScreenConfig,
}

impl SessionConfig {
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            screen: ScreenConfig::default(),
        }
    }
}

#[uniffi::export]
pub fn default_session_config(database_path: String) -> SessionConfig {
    SessionConfig::new(database_path)
}
