//! Data-access seams consumed by the presentation layer.
//!
//! `SpotRepository` is the only thing the state holder talks to. The default
//! implementation composes the SQLite store with platform location and camera
//! services, which native code provides through the collaborator traits.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::Result;
use crate::location::LocationFeed;
use crate::model::{
    CameraCaptureError, CaptureHandle, CreateSpotResult, NewSpot, Spot, UserLocation,
};
use crate::store::SpotStore;

#[async_trait]
pub trait SpotRepository: Send + Sync {
    /// Current list on subscription, then every change.
    fn spots(&self) -> BoxStream<'static, Vec<Spot>>;

    async fn current_location(&self) -> Result<Option<UserLocation>>;

    /// Infinite; dropping the stream unsubscribes.
    fn location_updates(&self) -> BoxStream<'static, UserLocation>;

    async fn create_spot(&self, handle: &CaptureHandle) -> Result<CreateSpotResult>;

    async fn delete_spot(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Option<UserLocation>>;

    fn updates(&self) -> BoxStream<'static, UserLocation>;
}

#[async_trait]
pub trait CameraCapture: Send + Sync {
    /// Takes a photo and returns the uri it was saved to.
    async fn capture(&self, handle: &CaptureHandle) -> std::result::Result<String, CameraCaptureError>;
}

/// Pairs a one-shot fix source with the live feed the platform pushes into.
pub struct FeedLocationProvider<F> {
    fetch: F,
    feed: LocationFeed,
}

impl<F> FeedLocationProvider<F> {
    pub fn new(fetch: F, feed: LocationFeed) -> Self {
        Self { fetch, feed }
    }
}

#[async_trait]
pub trait CurrentLocation: Send + Sync {
    async fn fetch(&self) -> Result<Option<UserLocation>>;
}

#[async_trait]
impl<F: CurrentLocation> LocationProvider for FeedLocationProvider<F> {
    async fn current_location(&self) -> Result<Option<UserLocation>> {
        self.fetch.fetch().await
    }

    fn updates(&self) -> BoxStream<'static, UserLocation> {
        self.feed.updates()
    }
}

pub struct DefaultSpotRepository {
    store: Arc<SpotStore>,
    location: Arc<dyn LocationProvider>,
    camera: Arc<dyn CameraCapture>,
}

impl DefaultSpotRepository {
    pub fn new(
        store: Arc<SpotStore>,
        location: Arc<dyn LocationProvider>,
        camera: Arc<dyn CameraCapture>,
    ) -> Self {
        Self {
            store,
            location,
            camera,
        }
    }

    pub fn store(&self) -> &Arc<SpotStore> {
        &self.store
    }
}

fn spot_title() -> String {
    format!("Spot {}", chrono::Local::now().format("%Y-%m-%d %H:%M"))
}

#[async_trait]
impl SpotRepository for DefaultSpotRepository {
    fn spots(&self) -> BoxStream<'static, Vec<Spot>> {
        self.store.watch()
    }

    async fn current_location(&self) -> Result<Option<UserLocation>> {
        self.location.current_location().await
    }

    fn location_updates(&self) -> BoxStream<'static, UserLocation> {
        self.location.updates()
    }

    async fn create_spot(&self, handle: &CaptureHandle) -> Result<CreateSpotResult> {
        let location = match self.location.current_location().await {
            Ok(Some(location)) => location,
            Ok(None) => return Ok(CreateSpotResult::NoLocation),
            Err(error) => {
                tracing::warn!("location fetch failed during capture: {error}");
                return Ok(CreateSpotResult::NoLocation);
            }
        };

        if let Err(error) = location.validate() {
            return Ok(CreateSpotResult::InvalidCoordinates {
                message: error.to_string(),
            });
        }

        let image_uri = match self.camera.capture(handle).await {
            Ok(uri) => uri,
            Err(error) => {
                tracing::warn!(kind = %error, "photo capture failed");
                return Ok(CreateSpotResult::PhotoCaptureFailed { error });
            }
        };

        self.store.insert(NewSpot {
            title: spot_title(),
            latitude: location.latitude,
            longitude: location.longitude,
            image_uri,
        })?;

        Ok(CreateSpotResult::Success)
    }

    async fn delete_spot(&self, id: i64) -> Result<()> {
        self.store.delete(id)
    }
}
