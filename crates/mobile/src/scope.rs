//! Task scope tied to the lifetime of a screen or state holder.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinSet};

/// Every unit of work launched here is aborted together by [`cancel`] or
/// when the scope is dropped. Nothing can be launched after cancellation.
///
/// [`cancel`]: ScreenScope::cancel
pub struct ScreenScope {
    handle: Handle,
    tasks: Mutex<JoinSet<()>>,
    cancelled: AtomicBool,
}

impl ScreenScope {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            tasks: Mutex::new(JoinSet::new()),
            cancelled: AtomicBool::new(false),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `None` once the scope has been cancelled.
    pub fn launch<F>(&self, future: F) -> Option<AbortHandle>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks();
        if self.cancelled.load(Ordering::Acquire) {
            tracing::debug!("launch on cancelled scope ignored");
            return None;
        }

        // reap finished work so the set does not grow with every action
        while tasks.try_join_next().is_some() {}

        Some(tasks.spawn_on(future, &self.handle))
    }

    pub fn cancel(&self) {
        let mut tasks = self.tasks();
        self.cancelled.store(true, Ordering::Release);
        tracing::debug!(active = tasks.len(), "cancelling scope");
        tasks.abort_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn active(&self) -> usize {
        let mut tasks = self.tasks();
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }
}
