//! Shared fakes for the state holder and screen tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use spot_map_core::error::{Result, SpotError};
use spot_map_core::location::LocationFeed;
use spot_map_core::model::{CaptureHandle, CreateSpotResult, Spot, UserLocation};
use spot_map_core::repository::SpotRepository;
use tokio::sync::{Notify, watch};

pub fn spot(id: i64, title: &str) -> Spot {
    Spot {
        id,
        title: title.into(),
        latitude: 40.41678,
        longitude: -3.70379,
        image_uri: format!("file:///photos/{id}.jpg"),
        created_at_ms: 0,
    }
}

/// Lets every ready task on the current-thread test runtime run to idle.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

pub struct StubRepository {
    spots: watch::Sender<Vec<Spot>>,
    feed: LocationFeed,
    location: Mutex<std::result::Result<Option<UserLocation>, String>>,
    create_result: Mutex<std::result::Result<CreateSpotResult, String>>,
    create_gate: Mutex<Option<Arc<Notify>>>,
    delete_failure: Mutex<Option<String>>,
    location_calls: Mutex<usize>,
    create_calls: Mutex<Vec<CaptureHandle>>,
    deleted: Mutex<Vec<i64>>,
}

impl StubRepository {
    pub fn new() -> Arc<Self> {
        let (spots, _) = watch::channel(Vec::new());
        Arc::new(Self {
            spots,
            feed: LocationFeed::new(),
            location: Mutex::new(Ok(None)),
            create_result: Mutex::new(Ok(CreateSpotResult::Success)),
            create_gate: Mutex::new(None),
            delete_failure: Mutex::new(None),
            location_calls: Mutex::new(0),
            create_calls: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        })
    }

    pub fn publish_spots(&self, spots: Vec<Spot>) {
        self.spots.send_replace(spots);
    }

    pub fn push_location(&self, location: UserLocation) {
        self.feed.push(location);
    }

    pub fn location_subscribers(&self) -> usize {
        self.feed.subscriber_count()
    }

    pub fn set_location(&self, location: std::result::Result<Option<UserLocation>, String>) {
        *self.location.lock().unwrap() = location;
    }

    pub fn set_create_result(&self, result: std::result::Result<CreateSpotResult, String>) {
        *self.create_result.lock().unwrap() = result;
    }

    pub fn set_delete_failure(&self, failure: Option<String>) {
        *self.delete_failure.lock().unwrap() = failure;
    }

    /// `create_spot` blocks until the returned gate is notified.
    pub fn hold_create(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.create_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn location_calls(&self) -> usize {
        *self.location_calls.lock().unwrap()
    }

    pub fn create_calls(&self) -> Vec<CaptureHandle> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<i64> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpotRepository for StubRepository {
    fn spots(&self) -> BoxStream<'static, Vec<Spot>> {
        let receiver = self.spots.subscribe();
        stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let spots = receiver.borrow_and_update().clone();
            Some((spots, (receiver, false)))
        })
        .boxed()
    }

    async fn current_location(&self) -> Result<Option<UserLocation>> {
        *self.location_calls.lock().unwrap() += 1;
        self.location.lock().unwrap().clone().map_err(SpotError::Fault)
    }

    fn location_updates(&self) -> BoxStream<'static, UserLocation> {
        self.feed.updates()
    }

    async fn create_spot(&self, handle: &CaptureHandle) -> Result<CreateSpotResult> {
        self.create_calls.lock().unwrap().push(handle.clone());

        let gate = self.create_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.create_result.lock().unwrap().clone().map_err(SpotError::Fault)
    }

    async fn delete_spot(&self, id: i64) -> Result<()> {
        self.deleted.lock().unwrap().push(id);
        match self.delete_failure.lock().unwrap().clone() {
            Some(failure) => Err(SpotError::Persistence(failure)),
            None => Ok(()),
        }
    }
}
