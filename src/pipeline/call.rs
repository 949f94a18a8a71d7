//! Call-shape driving loop.

use std::sync::Arc;

use tracing::{debug, info};

use super::CallProcessor;
use crate::bridge::{Session, WaitConfig, WaitResult};
use crate::bus::BrokerPort;
use crate::config::{
    poll_interval_from_secs, require_channel, timeout_from_secs, CallConfig, ConfigError,
};
use crate::error::{BridgeError, Result};
use crate::policy::CallTimeoutAction;

/// Filter that sends each item to an external responder and waits for its
/// result.
///
/// Items are handled strictly one at a time and output keeps input order.
/// When no response arrives in time the item is dropped (`drop`) or passed
/// through untouched (`input`).
pub struct CallFilter<P: CallProcessor> {
    session: Session,
    action: CallTimeoutAction,
    processor: P,
}

impl<P: CallProcessor> CallFilter<P> {
    /// Create a filter; the session must have an outbound channel.
    pub fn new(
        session: Session,
        action: CallTimeoutAction,
        processor: P,
    ) -> std::result::Result<Self, ConfigError> {
        if session.config().channel_out.is_none() {
            return Err(ConfigError::MissingChannelOut);
        }
        Ok(Self {
            session,
            action,
            processor,
        })
    }

    /// Build a filter from raw configuration, validating it first.
    pub fn from_config(
        broker: Arc<dyn BrokerPort>,
        config: &CallConfig,
        processor: P,
    ) -> std::result::Result<Self, ConfigError> {
        let action: CallTimeoutAction = config.timeout_action.parse()?;
        require_channel("channel_out", &config.channel_out)?;
        let session = Session::new(
            broker,
            WaitConfig {
                channel_in: config.channel_in.clone(),
                channel_out: Some(config.channel_out.clone()),
                timeout: timeout_from_secs(config.timeout_secs)?,
                poll_interval: poll_interval_from_secs(config.poll_interval_secs)?,
            },
        )?;

        info!(
            channel_out = %config.channel_out,
            channel_in = %config.channel_in,
            timeout_action = %action,
            "Call filter initialized"
        );

        Self::new(session, action, processor)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one call for a single item.
    pub async fn process(&mut self, item: P::Item) -> Result<Vec<P::Item>> {
        let request = self
            .processor
            .encode(&item)
            .map_err(BridgeError::Processor)?;

        match self.session.wait_for_response(Some(request)).await? {
            WaitResult::Delivered(payload) => self
                .processor
                .process(item, payload)
                .map_err(BridgeError::Processor),
            WaitResult::TimedOut => {
                let records = self.action.on_timeout(item);
                debug!(
                    timeout_action = %self.action,
                    records = records.len(),
                    "Applied timeout action"
                );
                Ok(records)
            }
        }
    }

    /// Run calls for a batch, one item at a time, keeping input order.
    pub async fn process_batch(&mut self, items: Vec<P::Item>) -> Result<Vec<P::Item>> {
        let mut output = Vec::with_capacity(items.len());
        for item in items {
            output.extend(self.process(item).await?);
        }
        Ok(output)
    }
}
