//! State holder behind the map screen.
//!
//! Every action runs on the view-model scope and reports back only through
//! the observable fields. Failures never escape: each one ends up as a single
//! message in `error`, and `loading` always drops back to false.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use spot_map_core::model::{CaptureHandle, Spot, UserLocation};
use spot_map_core::repository::SpotRepository;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::config::ScreenConfig;
use crate::scope::ScreenScope;
use crate::state::cell::StateCell;
use crate::state::messages;
use crate::state::shared::SharedState;

#[derive(Default)]
struct Fields {
    user_location: StateCell<Option<UserLocation>>,
    loading: StateCell<bool>,
    error: StateCell<Option<String>>,
    capture_result: StateCell<Option<bool>>,
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct ViewModelSnapshot {
    pub spots: Vec<Spot>,
    pub user_location: Option<UserLocation>,
    pub loading: bool,
    pub error: Option<String>,
    pub capture_result: Option<bool>,
}

#[derive(uniffi::Object)]
pub struct MapViewModel {
    repository: Arc<dyn SpotRepository>,
    scope: ScreenScope,
    spots: SharedState<Vec<Spot>>,
    fields: Arc<Fields>,
    location_updates: Mutex<Option<AbortHandle>>,
}

impl MapViewModel {
    pub fn new(repository: Arc<dyn SpotRepository>, runtime: Handle, config: &ScreenConfig) -> Self {
        let scope = ScreenScope::new(runtime);
        let spots = {
            let repository = Arc::clone(&repository);
            SharedState::launch(
                &scope,
                Vec::new(),
                Duration::from_millis(config.spot_retention_ms),
                move || repository.spots(),
            )
        };

        Self {
            repository,
            scope,
            spots,
            fields: Arc::new(Fields::default()),
            location_updates: Mutex::new(None),
        }
    }

    pub fn subscribe_spots(&self) -> watch::Receiver<Vec<Spot>> {
        self.spots.subscribe()
    }

    pub fn subscribe_user_location(&self) -> watch::Receiver<Option<UserLocation>> {
        self.fields.user_location.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.fields.loading.subscribe()
    }

    pub fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        self.fields.error.subscribe()
    }

    pub fn subscribe_capture_result(&self) -> watch::Receiver<Option<bool>> {
        self.fields.capture_result.subscribe()
    }

    fn location_job(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.location_updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn fetch_location(&self) -> impl Future<Output = ()> + Send + 'static {
        let repository = Arc::clone(&self.repository);
        let fields = Arc::clone(&self.fields);

        async move {
            fields.loading.set(true);
            match repository.current_location().await {
                Ok(Some(location)) => fields.user_location.set(Some(location)),
                Ok(None) => tracing::debug!("no location fix available"),
                Err(error) => {
                    tracing::warn!(%error, "failed to load user location");
                    fields.error.set(Some(messages::location_error(&error)));
                }
            }
            fields.loading.set(false);
        }
    }

    /// Subscribes before returning so no fix pushed afterwards is missed.
    fn follow_location(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut updates = self.repository.location_updates();
        let fields = Arc::clone(&self.fields);

        async move {
            while let Some(location) = updates.next().await {
                fields.user_location.set(Some(location));
            }
            tracing::debug!("location updates ended");
        }
    }

    /// A live-location job owned by the caller. Several may run at once;
    /// aborting one leaves the others and `start_location_updates` alone.
    pub(crate) fn follow_location_updates(&self) -> Option<AbortHandle> {
        self.scope.launch(self.follow_location())
    }

    fn run_create_spot(&self, handle: CaptureHandle) -> impl Future<Output = ()> + Send + 'static {
        let repository = Arc::clone(&self.repository);
        let fields = Arc::clone(&self.fields);

        async move {
            fields.loading.set(true);
            match repository.create_spot(&handle).await {
                Ok(result) => match messages::create_spot_failure(&result) {
                    None => {
                        tracing::info!("spot created");
                        fields.capture_result.set(Some(true));
                    }
                    Some(message) => {
                        tracing::warn!(?result, "spot was not created");
                        fields.error.set(Some(message));
                        fields.capture_result.set(Some(false));
                    }
                },
                Err(error) => {
                    tracing::error!(%error, "spot creation failed");
                    fields.error.set(Some(messages::unexpected_error(&error)));
                    fields.capture_result.set(Some(false));
                }
            }
            fields.loading.set(false);
        }
    }

    fn run_delete_spot(&self, id: i64) -> impl Future<Output = ()> + Send + 'static {
        let repository = Arc::clone(&self.repository);
        let fields = Arc::clone(&self.fields);

        async move {
            fields.loading.set(true);
            // the spot list follows storage, nothing to patch locally
            if let Err(error) = repository.delete_spot(id).await {
                tracing::warn!(id, %error, "failed to delete spot");
                fields.error.set(Some(messages::delete_error(&error)));
            }
            fields.loading.set(false);
        }
    }
}

#[uniffi::export]
impl MapViewModel {
    pub fn load_user_location(&self) {
        self.scope.launch(self.fetch_location());
    }

    /// Replaces any running subscription.
    pub fn start_location_updates(&self) {
        let job = self.follow_location_updates();
        if let Some(previous) = std::mem::replace(&mut *self.location_job(), job) {
            previous.abort();
        }
    }

    pub fn stop_location_updates(&self) {
        if let Some(job) = self.location_job().take() {
            tracing::debug!("stopping location updates");
            job.abort();
        }
    }

    pub fn create_spot(&self, handle: CaptureHandle) {
        self.scope.launch(self.run_create_spot(handle));
    }

    pub fn delete_spot(&self, id: i64) {
        self.scope.launch(self.run_delete_spot(id));
    }

    pub fn clear_error(&self) {
        self.fields.error.set(None);
    }

    pub fn clear_capture_result(&self) {
        self.fields.capture_result.set(None);
    }

    pub fn spots(&self) -> Vec<Spot> {
        self.spots.get()
    }

    pub fn user_location(&self) -> Option<UserLocation> {
        self.fields.user_location.get()
    }

    pub fn is_loading(&self) -> bool {
        self.fields.loading.get()
    }

    pub fn error(&self) -> Option<String> {
        self.fields.error.get()
    }

    pub fn capture_result(&self) -> Option<bool> {
        self.fields.capture_result.get()
    }

    pub fn snapshot(&self) -> ViewModelSnapshot {
        ViewModelSnapshot {
            spots: self.spots(),
            user_location: self.user_location(),
            loading: self.is_loading(),
            error: self.error(),
            capture_result: self.capture_result(),
        }
    }

    /// Tears down every running action. The view model is inert afterwards.
    pub fn close(&self) {
        self.stop_location_updates();
        self.scope.cancel();
        // aborted actions never reach their own reset
        self.fields.loading.set(false);
    }
}
