//! Redis broker implementation.
//!
//! Publishes through a shared `ConnectionManager` and opens one dedicated
//! pub/sub connection per subscription (`PSUBSCRIBE`). Unsubscribing aborts
//! the dispatch task, which drops the connection and with it the server-side
//! subscription.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{debug, info, warn};

use super::{
    BrokerPort, BusError, Delivery, Message, MessageHandler, Result, SubscriptionId,
    SubscriptionTable,
};
use crate::config::BrokerConfig;

/// Redis pub/sub broker.
pub struct RedisBroker {
    client: Client,
    conn: ConnectionManager,
    subscriptions: SubscriptionTable,
}

impl RedisBroker {
    /// Connect using broker configuration (host, port, database index).
    pub async fn connect(config: &BrokerConfig) -> Result<Self> {
        Self::from_url(&config.url()).await
    }

    /// Connect to a Redis URL (e.g., redis://localhost:6379/0).
    pub async fn from_url(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| BusError::Connection(e.to_string()))?;
        let conn = ConnectionManager::new(client.clone())
            .await
            .map_err(|e| BusError::Connection(e.to_string()))?;

        info!(url = %url, "Connected to Redis");

        Ok(Self {
            client,
            conn,
            subscriptions: SubscriptionTable::new(),
        })
    }
}

#[async_trait]
impl BrokerPort for RedisBroker {
    #[tracing::instrument(name = "bus.publish", skip_all, fields(channel = %channel))]
    async fn publish(&self, channel: &str, payload: Bytes) -> Result<()> {
        let mut conn = self.conn.clone();

        let receivers: i64 = conn
            .publish(channel, payload.as_ref())
            .await
            .map_err(|e| BusError::Publish {
                channel: channel.to_string(),
                message: e.to_string(),
            })?;

        debug!(receivers, bytes = payload.len(), "Published message to Redis");

        Ok(())
    }

    async fn subscribe(
        &self,
        pattern: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<SubscriptionId> {
        let subscribe_error = |e: redis::RedisError| BusError::Subscribe {
            pattern: pattern.to_string(),
            message: e.to_string(),
        };

        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(subscribe_error)?;
        pubsub.psubscribe(pattern).await.map_err(subscribe_error)?;

        let filter = pattern.to_string();
        let id = self.subscriptions.spawn(async move {
            let mut messages = pubsub.into_on_message();
            while let Some(msg) = messages.next().await {
                let message = Message {
                    channel: msg.get_channel_name().to_string(),
                    payload: Bytes::copy_from_slice(msg.get_payload_bytes()),
                };

                debug!(
                    pattern = %filter,
                    channel = %message.channel,
                    "Received message via Redis"
                );

                if handler.on_message(message) == Delivery::Release {
                    return;
                }
            }
            warn!(pattern = %filter, "Redis pub/sub connection closed");
        });

        debug!(subscription = %id, pattern = %pattern, "Subscribed to Redis");

        Ok(id)
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        if self.subscriptions.remove(subscription) {
            debug!(subscription = %subscription, "Unsubscribed from Redis");
        }
    }

    fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }
}
