//! Fire-and-forget writer.

use std::sync::Arc;

use tracing::{debug, info};

use super::PayloadEncoder;
use crate::bus::BrokerPort;
use crate::config::{require_channel, BroadcastConfig, ConfigError};
use crate::error::{BridgeError, Result};

/// Publishes every item on a fixed channel without waiting for anyone.
pub struct Broadcaster<E: PayloadEncoder> {
    broker: Arc<dyn BrokerPort>,
    channel_out: String,
    encoder: E,
}

impl<E: PayloadEncoder> Broadcaster<E> {
    pub fn new(
        broker: Arc<dyn BrokerPort>,
        channel_out: impl Into<String>,
        encoder: E,
    ) -> std::result::Result<Self, ConfigError> {
        let channel_out = channel_out.into();
        require_channel("channel_out", &channel_out)?;
        Ok(Self {
            broker,
            channel_out,
            encoder,
        })
    }

    pub fn from_config(
        broker: Arc<dyn BrokerPort>,
        config: &BroadcastConfig,
        encoder: E,
    ) -> std::result::Result<Self, ConfigError> {
        let broadcaster = Self::new(broker, config.channel_out.clone(), encoder)?;
        info!(channel_out = %config.channel_out, "Broadcaster initialized");
        Ok(broadcaster)
    }

    pub fn channel_out(&self) -> &str {
        &self.channel_out
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Publish each item in order.
    ///
    /// Stops at the first encoding or broker failure; items before it have
    /// already been sent.
    pub async fn write(&self, items: &[E::Item]) -> Result<()> {
        for item in items {
            let payload = self.encoder.encode(item).map_err(BridgeError::Processor)?;
            debug!(channel_out = %self.channel_out, bytes = payload.len(), "Broadcasting");
            self.broker.publish(&self.channel_out, payload).await?;
        }
        Ok(())
    }
}
