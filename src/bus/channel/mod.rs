//! In-memory channel-based broker for standalone mode.
//!
//! Uses a tokio broadcast channel for pub/sub within a single process.
//! Ideal for local development and testing without external dependencies.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use super::{
    pattern_matches, BrokerPort, Delivery, Message, MessageHandler, Result, SubscriptionId,
    SubscriptionTable,
};

/// Channel capacity for broadcast.
const CHANNEL_CAPACITY: usize = 1024;

/// In-memory broker using a tokio broadcast channel.
///
/// Every subscription gets its own receiver and dispatch task. Pattern
/// filtering is done on the subscriber side.
pub struct ChannelBroker {
    /// Broadcast sender for publishing messages.
    sender: broadcast::Sender<Message>,
    /// Dispatch tasks of armed subscriptions.
    subscriptions: SubscriptionTable,
}

impl ChannelBroker {
    /// Create a new channel broker.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        info!("Channel broker initialized");

        Self {
            sender,
            subscriptions: SubscriptionTable::new(),
        }
    }

    /// Create a new broker that shares the same channel.
    ///
    /// Subscriptions are tracked per broker instance.
    pub fn linked(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            subscriptions: SubscriptionTable::new(),
        }
    }
}

impl Default for ChannelBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerPort for ChannelBroker {
    #[tracing::instrument(name = "bus.publish", skip_all, fields(channel = %channel))]
    async fn publish(&self, channel: &str, payload: Bytes) -> Result<()> {
        let message = Message {
            channel: channel.to_string(),
            payload,
        };

        // Send to channel (ignore error if no receivers)
        match self.sender.send(message) {
            Ok(receiver_count) => {
                debug!(receivers = receiver_count, "Published message to channel");
            }
            Err(_) => {
                debug!("Published message (no receivers)");
            }
        }

        Ok(())
    }

    async fn subscribe(
        &self,
        pattern: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<SubscriptionId> {
        // Receiver exists before we return, so nothing published afterwards is missed.
        let mut receiver = self.sender.subscribe();
        let filter = pattern.to_string();

        let id = self.subscriptions.spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => {
                        if !pattern_matches(&filter, &message.channel) {
                            continue;
                        }

                        debug!(
                            pattern = %filter,
                            channel = %message.channel,
                            "Received message via channel"
                        );

                        if handler.on_message(message) == Delivery::Release {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        error!(skipped = n, "Channel subscriber lagged, skipped messages");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Channel closed, stopping subscriber");
                        break;
                    }
                }
            }
        });

        debug!(subscription = %id, pattern = %pattern, "Subscribed to channel broker");

        Ok(id)
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        if self.subscriptions.remove(subscription) {
            debug!(subscription = %subscription, "Unsubscribed from channel broker");
        }
    }

    fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }
}
