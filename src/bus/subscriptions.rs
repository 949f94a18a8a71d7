//! Bookkeeping for broker-managed dispatch tasks.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::debug;

use super::SubscriptionId;

type Entries = Arc<Mutex<HashMap<SubscriptionId, JoinHandle<()>>>>;

/// Live subscriptions of one broker, keyed by id.
///
/// Each subscription is a spawned dispatch task. A task that finishes on its
/// own (handler released, channel closed) removes its entry; `remove` aborts
/// the task of a still-armed subscription.
#[derive(Default)]
pub struct SubscriptionTable {
    entries: Entries,
    next_id: AtomicU64,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a dispatch task and register it under a fresh id.
    pub fn spawn<F>(&self, dispatch: F) -> SubscriptionId
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entries = Arc::clone(&self.entries);

        // Hold the lock across spawn so a task that finishes immediately
        // cannot try to remove itself before it was inserted.
        let mut guard = lock(&self.entries);
        let task = tokio::spawn(async move {
            dispatch.await;
            if lock(&entries).remove(&id).is_some() {
                debug!(subscription = %id, "Subscription released by dispatch");
            }
        });
        guard.insert(id, task);
        id
    }

    /// Remove a subscription, aborting its dispatch task if still running.
    ///
    /// Returns false when the id was unknown or already released.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        match lock(&self.entries).remove(&id) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for SubscriptionTable {
    fn drop(&mut self) {
        for (_, task) in lock(&self.entries).drain() {
            task.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
