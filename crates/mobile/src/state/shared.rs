//! Upstream projection that only runs while someone is watching.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::sync::{Notify, watch};

use crate::scope::ScreenScope;

struct Inner<T> {
    sender: watch::Sender<T>,
    subscribed: Notify,
    collecting: AtomicBool,
}

/// Caches the latest upstream value for any number of readers.
///
/// The upstream is started on the first subscription and kept for `retention`
/// after the last reader goes away, so a quick re-subscription (a screen
/// being recreated) reuses the running upstream. The cached value survives
/// the upstream being stopped.
pub struct SharedState<T> {
    inner: Arc<Inner<T>>,
}

impl<T> SharedState<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn launch<S>(scope: &ScreenScope, initial: T, retention: Duration, upstream: S) -> Self
    where
        S: Fn() -> BoxStream<'static, T> + Send + 'static,
    {
        let (sender, _) = watch::channel(initial);
        let inner = Arc::new(Inner {
            sender,
            subscribed: Notify::new(),
            collecting: AtomicBool::new(false),
        });

        scope.launch(collect(Arc::clone(&inner), retention, upstream));

        Self { inner }
    }

    pub fn get(&self) -> T {
        self.inner.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        let receiver = self.inner.sender.subscribe();
        self.inner.subscribed.notify_one();
        receiver
    }

    pub fn is_collecting(&self) -> bool {
        self.inner.collecting.load(Ordering::Acquire)
    }
}

async fn collect<T, S>(inner: Arc<Inner<T>>, retention: Duration, upstream: S)
where
    T: PartialEq,
    S: Fn() -> BoxStream<'static, T>,
{
    loop {
        while inner.sender.receiver_count() == 0 {
            inner.subscribed.notified().await;
        }

        tracing::debug!("starting upstream collection");
        inner.collecting.store(true, Ordering::Release);
        let mut stream = upstream();

        loop {
            tokio::select! {
                item = stream.next() => {
                    let Some(value) = item else {
                        tracing::debug!("upstream completed");
                        inner.collecting.store(false, Ordering::Release);
                        return;
                    };
                    inner.sender.send_if_modified(|current| {
                        if *current == value {
                            return false;
                        }
                        *current = value;
                        true
                    });
                }
                _ = inner.sender.closed() => {
                    let expired = tokio::select! {
                        _ = tokio::time::sleep(retention) => inner.sender.receiver_count() == 0,
                        _ = inner.subscribed.notified() => false,
                    };
                    if expired {
                        break;
                    }
                }
            }
        }

        drop(stream);
        inner.collecting.store(false, Ordering::Release);
        tracing::debug!("stopped upstream collection");
    }
}
