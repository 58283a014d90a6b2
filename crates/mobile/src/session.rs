//! Entry point the native app holds for as long as it runs.

use std::sync::Arc;

use eyre::WrapErr;
use spot_map_core::location::LocationFeed;
use spot_map_core::model::UserLocation;
use spot_map_core::repository::{DefaultSpotRepository, FeedLocationProvider};
use spot_map_core::store::SpotStore;
use tokio::runtime::Runtime;

use crate::bridge::{
    ForeignCamera, ForeignLocationProvider, ImagePrefetcher, MapSurface, Navigator,
    PlatformCamera, PlatformLocation,
};
use crate::config::{ScreenConfig, SessionConfig};
use crate::state::view::MapScreen;
use crate::state::view_model::MapViewModel;

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum SessionError {
    #[error("{0}")]
    Startup(String),
}

/// Owns the runtime every screen and action runs on, the spot store and the
/// state holder shared by all map screens.
#[derive(uniffi::Object)]
pub struct SpotMapSession {
    view_model: Arc<MapViewModel>,
    feed: LocationFeed,
    screen_config: ScreenConfig,
    // declared last so tasks are torn down before the runtime goes
    runtime: Runtime,
}

impl SpotMapSession {
    fn build(
        config: SessionConfig,
        location: Arc<dyn ForeignLocationProvider>,
        camera: Arc<dyn ForeignCamera>,
    ) -> eyre::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .thread_name("spot-map")
            .build()
            .wrap_err("failed to start runtime")?;

        let store = SpotStore::open(&config.database_path)
            .wrap_err_with(|| format!("failed to open spot store at {}", config.database_path))?;

        let feed = LocationFeed::new();
        let repository = DefaultSpotRepository::new(
            Arc::new(store),
            Arc::new(FeedLocationProvider::new(
                PlatformLocation(location),
                feed.clone(),
            )),
            Arc::new(PlatformCamera(camera)),
        );

        let view_model = Arc::new(MapViewModel::new(
            Arc::new(repository),
            runtime.handle().clone(),
            &config.screen,
        ));

        tracing::info!(database = %config.database_path, "spot map session started");

        Ok(Self {
            view_model,
            feed,
            screen_config: config.screen,
            runtime,
        })
    }
}

#[uniffi::export]
impl SpotMapSession {
    #[uniffi::constructor]
    pub fn new(
        config: SessionConfig,
        location: Arc<dyn ForeignLocationProvider>,
        camera: Arc<dyn ForeignCamera>,
    ) -> Result<Self, SessionError> {
        Self::build(config, location, camera).map_err(|error| {
            tracing::error!("{error:?}");
            SessionError::Startup(format!("{error:#}"))
        })
    }

    pub fn view_model(&self) -> Arc<MapViewModel> {
        Arc::clone(&self.view_model)
    }

    /// A fresh screen for each time the native map view is created.
    pub fn open_map_screen(
        &self,
        surface: Arc<dyn MapSurface>,
        navigator: Arc<dyn Navigator>,
        prefetcher: Arc<dyn ImagePrefetcher>,
    ) -> Arc<MapScreen> {
        Arc::new(MapScreen::new(
            Arc::clone(&self.view_model),
            surface,
            navigator,
            prefetcher,
            self.screen_config.clone(),
            self.runtime.handle().clone(),
        ))
    }

    /// Live GPS fix from the platform's location callback.
    pub fn push_location(&self, latitude: f64, longitude: f64) {
        self.feed.push(UserLocation::new(latitude, longitude));
    }

    pub fn close(&self) {
        tracing::info!("closing spot map session");
        self.view_model.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use spot_map_core::model::CaptureHandle;

    use super::*;
    use crate::bridge::{CaptureFailure, ServiceError};
    use crate::state::view::frame::{CameraTarget, MapFrame};

    struct FixedLocation(UserLocation);

    #[async_trait]
    impl ForeignLocationProvider for FixedLocation {
        async fn current_location(&self) -> Result<Option<UserLocation>, ServiceError> {
            Ok(Some(self.0))
        }
    }

    struct DiskCamera;

    #[async_trait]
    impl ForeignCamera for DiskCamera {
        async fn capture(&self, handle: CaptureHandle) -> Result<String, CaptureFailure> {
            Ok(format!("file:///photos/{}.jpg", handle.token))
        }
    }

    #[derive(Default)]
    struct LastFrame(Mutex<Option<MapFrame>>);

    impl MapSurface for LastFrame {
        fn render(&self, frame: MapFrame) {
            *self.0.lock().unwrap() = Some(frame);
        }

        fn animate_camera(&self, _target: CameraTarget) {}

        fn show_message(&self, _message: String) {}

        fn capture_finished(&self, _success: bool) {}
    }

    struct Nowhere;

    impl Navigator for Nowhere {
        fn navigate_to_capture(&self) {}
    }

    impl ImagePrefetcher for Nowhere {
        fn prefetch(&self, _image_uri: String) {}
    }

    fn session(path: &str) -> SpotMapSession {
        SpotMapSession::new(
            SessionConfig::new(path),
            Arc::new(FixedLocation(UserLocation::new(40.4168, -3.7038))),
            Arc::new(DiskCamera),
        )
        .unwrap()
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_capture_appears_on_screen() {
        let session = session(":memory:");
        let surface = Arc::new(LastFrame::default());
        let screen = session.open_map_screen(
            Arc::clone(&surface) as _,
            Arc::new(Nowhere),
            Arc::new(Nowhere),
        );
        screen.appear();

        session.view_model().create_spot(CaptureHandle::new("first"));

        assert!(wait_until(|| {
            surface
                .0
                .lock()
                .unwrap()
                .as_ref()
                .is_some_and(|frame| frame.markers.len() == 1)
        }));

        let spot_id = screen.frame().markers[0].spot_id;
        screen.marker_tapped(spot_id);
        assert_eq!(
            screen.frame().detail.unwrap().coordinates,
            "40.4168, -3.7038"
        );

        screen.dispose();
        session.close();
    }

    #[test]
    fn test_pushed_locations_reach_view_model() {
        let session = session(":memory:");
        session.view_model().start_location_updates();

        assert!(wait_until(|| {
            session.push_location(1.5, 2.5);
            session.view_model().user_location() == Some(UserLocation::new(1.5, 2.5))
        }));

        session.close();
    }

    #[test]
    fn test_bad_database_path_fails_startup() {
        let result = SpotMapSession::new(
            SessionConfig::new("/nonexistent-dir/for/spots.db"),
            Arc::new(FixedLocation(UserLocation::new(0.0, 0.0))),
            Arc::new(DiskCamera),
        );

        match result {
            Err(SessionError::Startup(message)) => {
                assert!(message.contains("failed to open spot store"));
            }
            Ok(_) => panic!("session should not start"),
        }
    }
}
