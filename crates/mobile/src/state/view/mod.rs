//! Headless composition of the map screen.
//!
//! The native side renders whatever [`MapFrame`] it is handed and forwards
//! gestures back here. Selection, pending deletion and the one-time camera
//! centering are screen-local state; everything else is read from the
//! [`MapViewModel`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use spot_map_core::model::{Spot, UserLocation};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::bridge::{ImagePrefetcher, MapSurface, Navigator};
use crate::config::ScreenConfig;
use crate::scope::ScreenScope;
use crate::state::view::frame::{CameraTarget, DeletePrompt, DetailCard, MapFrame, MarkerModel};
use crate::state::view_model::MapViewModel;

pub mod frame;

#[derive(Default)]
struct UiState {
    spots: Vec<Spot>,
    selected: Option<Spot>,
    // independent of `selected`; both may be set at once
    pending_deletion: Option<Spot>,
    centered: bool,
    loading: bool,
}

struct ScreenShared {
    view_model: Arc<MapViewModel>,
    surface: Arc<dyn MapSurface>,
    navigator: Arc<dyn Navigator>,
    prefetcher: Arc<dyn ImagePrefetcher>,
    config: ScreenConfig,
    ui: Mutex<UiState>,
}

impl ScreenShared {
    fn ui(&self) -> MutexGuard<'_, UiState> {
        self.ui.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn frame(&self) -> MapFrame {
        let ui = self.ui();
        MapFrame {
            markers: ui.spots.iter().map(MarkerModel::from).collect(),
            detail: ui
                .selected
                .as_ref()
                .map(|spot| DetailCard::new(spot, self.config.coordinate_precision)),
            delete_prompt: ui.pending_deletion.as_ref().map(DeletePrompt::from),
            show_progress: ui.loading,
            // hidden under the progress overlay
            show_capture_button: !ui.loading,
        }
    }

    /// Applies `change` and pushes the new frame. The lock is released
    /// before the surface is called.
    fn update(&self, change: impl FnOnce(&mut UiState)) {
        change(&mut *self.ui());
        self.surface.render(self.frame());
    }

    fn spots_changed(&self, spots: Vec<Spot>) {
        for spot in &spots {
            self.prefetcher.prefetch(spot.image_uri.clone());
        }

        self.update(|ui| {
            let removed = ui
                .selected
                .as_ref()
                .is_some_and(|selected| !spots.iter().any(|spot| spot.id == selected.id));
            if removed {
                ui.selected = None;
            }
            ui.spots = spots;
        });
    }

    fn location_changed(&self, location: Option<UserLocation>) {
        let Some(location) = location else {
            return;
        };

        let already_centered = std::mem::replace(&mut self.ui().centered, true);
        if already_centered {
            return;
        }

        tracing::debug!(
            latitude = location.latitude,
            longitude = location.longitude,
            "centering map on user"
        );
        self.surface
            .animate_camera(CameraTarget::centered_on(location, self.config.center_zoom));
    }

    fn error_changed(&self, error: Option<String>) {
        if let Some(message) = error {
            self.surface.show_message(message);
            self.view_model.clear_error();
        }
    }

    fn capture_result_changed(&self, result: Option<bool>) {
        if let Some(success) = result {
            self.surface.capture_finished(success);
            self.view_model.clear_capture_result();
        }
    }

    fn loading_changed(&self, loading: bool) {
        self.update(|ui| ui.loading = loading);
    }

    fn find_spot(&self, spot_id: i64) -> Option<Spot> {
        let spot = self.ui().spots.iter().find(|spot| spot.id == spot_id).cloned();
        if spot.is_none() {
            tracing::debug!(spot_id, "gesture on unknown spot ignored");
        }
        spot
    }
}

#[derive(uniffi::Object)]
pub struct MapScreen {
    shared: Arc<ScreenShared>,
    scope: ScreenScope,
    appeared: AtomicBool,
    // this screen's live-location job on the shared view model
    location_job: Mutex<Option<AbortHandle>>,
}

impl MapScreen {
    pub fn new(
        view_model: Arc<MapViewModel>,
        surface: Arc<dyn MapSurface>,
        navigator: Arc<dyn Navigator>,
        prefetcher: Arc<dyn ImagePrefetcher>,
        config: ScreenConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            shared: Arc::new(ScreenShared {
                view_model,
                surface,
                navigator,
                prefetcher,
                config,
                ui: Mutex::new(UiState::default()),
            }),
            scope: ScreenScope::new(runtime),
            appeared: AtomicBool::new(false),
            location_job: Mutex::new(None),
        }
    }

    fn location_job(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.location_job
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `on_change` with the current value and then with every change,
    /// for as long as the screen is alive.
    fn bind<T, F>(&self, mut receiver: watch::Receiver<T>, on_change: F)
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&ScreenShared, T) + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        self.scope.launch(async move {
            loop {
                let value = receiver.borrow_and_update().clone();
                on_change(&*shared, value);
                if receiver.changed().await.is_err() {
                    break;
                }
            }
        });
    }
}

#[uniffi::export]
impl MapScreen {
    /// First display of the screen. Later calls do nothing.
    pub fn appear(&self) {
        if self.appeared.swap(true, Ordering::AcqRel) {
            return;
        }

        let view_model = &self.shared.view_model;
        self.bind(view_model.subscribe_spots(), ScreenShared::spots_changed);
        self.bind(view_model.subscribe_user_location(), ScreenShared::location_changed);
        self.bind(view_model.subscribe_loading(), ScreenShared::loading_changed);
        self.bind(view_model.subscribe_error(), ScreenShared::error_changed);
        self.bind(
            view_model.subscribe_capture_result(),
            ScreenShared::capture_result_changed,
        );

        view_model.load_user_location();
        *self.location_job() = view_model.follow_location_updates();
    }

    pub fn marker_tapped(&self, spot_id: i64) {
        if let Some(spot) = self.shared.find_spot(spot_id) {
            self.shared.update(|ui| ui.selected = Some(spot));
        }
    }

    pub fn map_tapped(&self) {
        self.shared.update(|ui| ui.selected = None);
    }

    pub fn info_window_long_pressed(&self, spot_id: i64) {
        if let Some(spot) = self.shared.find_spot(spot_id) {
            self.shared.update(|ui| ui.pending_deletion = Some(spot));
        }
    }

    /// The delete button on the detail card asks for confirmation first.
    pub fn detail_delete_pressed(&self) {
        self.shared.update(|ui| {
            if let Some(spot) = ui.selected.take() {
                ui.pending_deletion = Some(spot);
            }
        });
    }

    pub fn confirm_deletion(&self) {
        let mut pending = None;
        self.shared.update(|ui| pending = ui.pending_deletion.take());

        if let Some(spot) = pending {
            tracing::info!(spot_id = spot.id, "deleting spot");
            self.shared.view_model.delete_spot(spot.id);
        }
    }

    pub fn cancel_deletion(&self) {
        self.shared.update(|ui| ui.pending_deletion = None);
    }

    pub fn capture_pressed(&self) {
        self.shared.navigator.navigate_to_capture();
    }

    pub fn frame(&self) -> MapFrame {
        self.shared.frame()
    }

    /// Stops observing and ends the location job this screen started.
    /// Other screens on the same view model keep theirs.
    pub fn dispose(&self) {
        self.scope.cancel();
        if let Some(job) = self.location_job().take() {
            tracing::debug!("stopping screen location updates");
            job.abort();
        }
    }
}
