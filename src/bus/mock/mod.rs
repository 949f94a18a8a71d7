//! Mock broker implementation for testing.
//!
//! Delegates delivery to an in-memory `ChannelBroker` while recording every
//! call, so tests can assert on publish and subscription counts.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use super::{BrokerPort, BusError, ChannelBroker, MessageHandler, Result, SubscriptionId};

/// Mock broker for testing.
#[derive(Default)]
pub struct MockBroker {
    inner: ChannelBroker,
    published: Mutex<Vec<(String, Bytes)>>,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
    fail_on_publish: AtomicBool,
    fail_on_subscribe: AtomicBool,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_on_publish(&self, fail: bool) {
        self.fail_on_publish.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_on_subscribe(&self, fail: bool) {
        self.fail_on_subscribe.store(fail, Ordering::SeqCst);
    }

    /// Publishes recorded so far, in order.
    pub fn published(&self) -> Vec<(String, Bytes)> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn published_count(&self) -> usize {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }

    /// Publish on the underlying channel without recording it.
    ///
    /// Stands in for an external responder.
    pub async fn inject(&self, channel: &str, payload: Bytes) {
        // Channel publish cannot fail.
        let _ = self.inner.publish(channel, payload).await;
    }
}

#[async_trait]
impl BrokerPort for MockBroker {
    async fn publish(&self, channel: &str, payload: Bytes) -> Result<()> {
        if self.fail_on_publish.load(Ordering::SeqCst) {
            return Err(BusError::Connection("Mock publish failure".to_string()));
        }
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel.to_string(), payload.clone()));
        self.inner.publish(channel, payload).await
    }

    async fn subscribe(
        &self,
        pattern: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<SubscriptionId> {
        if self.fail_on_subscribe.load(Ordering::SeqCst) {
            return Err(BusError::Connection("Mock subscribe failure".to_string()));
        }
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.subscribe(pattern, handler).await
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.unsubscribe(subscription);
    }

    fn active_subscriptions(&self) -> usize {
        self.inner.active_subscriptions()
    }
}
