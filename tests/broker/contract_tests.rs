//! BrokerPort contract tests.
//!
//! Channels are namespaced by a per-run prefix so runs against a shared
//! server do not see each other's traffic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use courier::bus::{BrokerPort, Delivery, Message, MessageHandler};
use courier::{Session, WaitConfig, WaitResult};

/// Time allowed for asynchronous delivery to settle.
const SETTLE: Duration = Duration::from_millis(200);

/// Counts messages and returns a fixed verdict.
pub struct CountingHandler {
    pub count: AtomicUsize,
    verdict: Delivery,
}

impl CountingHandler {
    pub fn new(verdict: Delivery) -> Arc<Self> {
        Arc::new(Self {
            count: AtomicUsize::new(0),
            verdict,
        })
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl MessageHandler for CountingHandler {
    fn on_message(&self, _message: Message) -> Delivery {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.verdict
    }
}

/// Forwards every message into a channel.
struct ForwardingHandler(mpsc::UnboundedSender<Message>);

impl MessageHandler for ForwardingHandler {
    fn on_message(&self, message: Message) -> Delivery {
        let _ = self.0.send(message);
        Delivery::Continue
    }
}

/// Answer every request on `requests` with `reply(payload)` on `replies`.
pub async fn spawn_responder(
    broker: Arc<dyn BrokerPort>,
    requests: &str,
    replies: &str,
    reply: fn(&[u8]) -> Vec<u8>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    broker
        .subscribe(requests, Arc::new(ForwardingHandler(tx)))
        .await
        .expect("responder subscribe should succeed");

    let replies = replies.to_string();
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            broker
                .publish(&replies, Bytes::from(reply(&request.payload)))
                .await
                .expect("responder publish should succeed");
        }
    });
}

fn upper(payload: &[u8]) -> Vec<u8> {
    payload.to_ascii_uppercase()
}

// =============================================================================
// BrokerPort tests
// =============================================================================

pub async fn test_subscribe_receives_published(broker: &Arc<dyn BrokerPort>, prefix: &str) {
    let channel = format!("{}.plain", prefix);
    let handler = CountingHandler::new(Delivery::Continue);

    let id = broker
        .subscribe(&channel, handler.clone())
        .await
        .expect("subscribe should succeed");
    broker
        .publish(&channel, Bytes::from_static(b"one"))
        .await
        .expect("publish should succeed");
    broker
        .publish(&channel, Bytes::from_static(b"two"))
        .await
        .expect("publish should succeed");
    tokio::time::sleep(SETTLE).await;

    assert_eq!(handler.count(), 2);
    broker.unsubscribe(id);
}

pub async fn test_pattern_subscription(broker: &Arc<dyn BrokerPort>, prefix: &str) {
    let handler = CountingHandler::new(Delivery::Continue);

    let id = broker
        .subscribe(&format!("{}.lang.*", prefix), handler.clone())
        .await
        .expect("subscribe should succeed");
    for channel in ["lang.en", "lang.de", "other"] {
        broker
            .publish(&format!("{}.{}", prefix, channel), Bytes::new())
            .await
            .expect("publish should succeed");
    }
    tokio::time::sleep(SETTLE).await;

    assert_eq!(handler.count(), 2);
    broker.unsubscribe(id);
}

pub async fn test_release_stops_dispatch(broker: &Arc<dyn BrokerPort>, prefix: &str) {
    let channel = format!("{}.release", prefix);
    let handler = CountingHandler::new(Delivery::Release);

    let id = broker
        .subscribe(&channel, handler.clone())
        .await
        .expect("subscribe should succeed");
    for _ in 0..3 {
        broker
            .publish(&channel, Bytes::from_static(b"x"))
            .await
            .expect("publish should succeed");
    }
    tokio::time::sleep(SETTLE).await;

    assert_eq!(handler.count(), 1);
    broker.unsubscribe(id);
}

pub async fn test_unsubscribe_stops_dispatch(broker: &Arc<dyn BrokerPort>, prefix: &str) {
    let channel = format!("{}.unsub", prefix);
    let handler = CountingHandler::new(Delivery::Continue);
    let before = broker.active_subscriptions();

    let id = broker
        .subscribe(&channel, handler.clone())
        .await
        .expect("subscribe should succeed");
    assert_eq!(broker.active_subscriptions(), before + 1);

    broker.unsubscribe(id);
    // Idempotent.
    broker.unsubscribe(id);
    assert_eq!(broker.active_subscriptions(), before);

    broker
        .publish(&channel, Bytes::from_static(b"late"))
        .await
        .expect("publish should succeed");
    tokio::time::sleep(SETTLE).await;

    assert_eq!(handler.count(), 0);
}

// =============================================================================
// Bridge tests
// =============================================================================

pub async fn test_round_trip(broker: &Arc<dyn BrokerPort>, prefix: &str) {
    let requests = format!("{}.requests", prefix);
    let replies = format!("{}.replies", prefix);
    spawn_responder(broker.clone(), &requests, &replies, upper).await;

    let mut session = Session::new(
        broker.clone(),
        WaitConfig {
            channel_in: replies,
            channel_out: Some(requests),
            timeout: Some(Duration::from_secs(5)),
            poll_interval: Duration::from_millis(10),
        },
    )
    .expect("session config should be valid");

    for word in ["hello", "world"] {
        let result = session
            .wait_for_response(Some(Bytes::from(word)))
            .await
            .expect("wait should succeed");
        assert_eq!(
            result,
            WaitResult::Delivered(Bytes::from(word.to_ascii_uppercase()))
        );
    }
}

pub async fn test_timeout_leaves_no_subscription(broker: &Arc<dyn BrokerPort>, prefix: &str) {
    let before = broker.active_subscriptions();
    let mut session = Session::new(
        broker.clone(),
        WaitConfig {
            channel_in: format!("{}.silent", prefix),
            channel_out: None,
            timeout: Some(Duration::from_millis(100)),
            poll_interval: Duration::from_millis(10),
        },
    )
    .expect("session config should be valid");

    let start = std::time::Instant::now();
    let result = session
        .wait_for_response(None)
        .await
        .expect("wait should succeed");

    assert_eq!(result, WaitResult::TimedOut);
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(broker.active_subscriptions(), before);
}

#[macro_export]
macro_rules! run_broker_contract_tests {
    ($broker:expr, $prefix:expr) => {
        use $crate::broker::contract_tests::*;

        test_subscribe_receives_published($broker, $prefix).await;
        println!("  test_subscribe_receives_published: PASSED");

        test_pattern_subscription($broker, $prefix).await;
        println!("  test_pattern_subscription: PASSED");

        test_release_stops_dispatch($broker, $prefix).await;
        println!("  test_release_stops_dispatch: PASSED");

        test_unsubscribe_stops_dispatch($broker, $prefix).await;
        println!("  test_unsubscribe_stops_dispatch: PASSED");

        test_round_trip($broker, $prefix).await;
        println!("  test_round_trip: PASSED");

        test_timeout_leaves_no_subscription($broker, $prefix).await;
        println!("  test_timeout_leaves_no_subscription: PASSED");
    };
}
