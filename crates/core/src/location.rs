//! Fan-out of live GPS fixes pushed in by the platform.

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::model::UserLocation;

const FEED_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct LocationFeed {
    sender: broadcast::Sender<UserLocation>,
}

impl Default for LocationFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    /// Returns the number of subscribers that will see this fix.
    pub fn push(&self, location: UserLocation) -> usize {
        self.sender.send(location).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Never ends while the feed is alive. A slow subscriber skips the
    /// fixes it missed instead of stopping.
    pub fn updates(&self) -> BoxStream<'static, UserLocation> {
        let receiver = self.sender.subscribe();

        stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(location) => return Some((location, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "location subscriber lagged");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}
