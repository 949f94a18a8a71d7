//! Single-value slot shared between a delivery handler and a waiting cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tokio::sync::Notify;

use crate::bus::{Delivery, Message, MessageHandler};

/// Write-once slot for the payload of one subscription.
///
/// The handler writes from the broker's dispatch task; the waiting cycle
/// reads from its own task. Only the first `fill` is stored.
#[derive(Debug, Default)]
pub struct ResultSlot {
    filled: AtomicBool,
    value: Mutex<Option<Bytes>>,
    notify: Notify,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` if the slot was never filled. Returns whether it was stored.
    pub fn fill(&self, payload: Bytes) -> bool {
        if self.filled.swap(true, Ordering::AcqRel) {
            return false;
        }
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload);
        self.notify.notify_one();
        true
    }

    /// Take the stored payload, leaving the slot empty (but still filled).
    pub fn take(&self) -> Option<Bytes> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_filled(&self) -> bool {
        self.filled.load(Ordering::Acquire)
    }

    /// Resolves once after a `fill`, even if the fill happened first.
    pub async fn filled(&self) {
        self.notify.notified().await;
    }
}

/// Handler that fills a slot with the first message and releases itself.
pub(crate) struct SlotHandler {
    slot: Arc<ResultSlot>,
}

impl SlotHandler {
    pub(crate) fn new(slot: Arc<ResultSlot>) -> Self {
        Self { slot }
    }
}

impl MessageHandler for SlotHandler {
    fn on_message(&self, message: Message) -> Delivery {
        self.slot.fill(message.payload);
        Delivery::Release
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fill_once() {
        let slot = ResultSlot::new();
        assert!(!slot.is_filled());

        assert!(slot.fill(Bytes::from_static(b"first")));
        assert!(!slot.fill(Bytes::from_static(b"second")));

        assert!(slot.is_filled());
        assert_eq!(slot.take(), Some(Bytes::from_static(b"first")));
        assert_eq!(slot.take(), None);
    }

    #[tokio::test]
    async fn test_filled_wakes_after_earlier_fill() {
        let slot = ResultSlot::new();
        slot.fill(Bytes::from_static(b"x"));

        tokio::time::timeout(Duration::from_secs(1), slot.filled())
            .await
            .expect("permit from earlier fill should be stored");
    }

    #[tokio::test]
    async fn test_fill_from_other_task() {
        let slot = Arc::new(ResultSlot::new());
        let writer = slot.clone();

        tokio::spawn(async move {
            writer.fill(Bytes::from_static(b"late"));
        });

        tokio::time::timeout(Duration::from_secs(1), slot.filled())
            .await
            .unwrap();
        assert_eq!(slot.take(), Some(Bytes::from_static(b"late")));
    }

    #[test]
    fn test_slot_handler_releases() {
        let slot = Arc::new(ResultSlot::new());
        let handler = SlotHandler::new(slot.clone());

        let verdict = handler.on_message(Message {
            channel: "data_in".to_string(),
            payload: Bytes::from_static(b"y"),
        });

        assert_eq!(verdict, Delivery::Release);
        assert_eq!(slot.take(), Some(Bytes::from_static(b"y")));
    }
}
