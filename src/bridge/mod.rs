//! Request/response bridge over a publish/subscribe broker.
//!
//! One wait cycle arms a subscription on the inbound channel, optionally
//! publishes an outbound payload, then waits for exactly one inbound message
//! or the timeout. The subscription is torn down on every exit path.
//!
//! ```text
//! subscribe(channel_in) --> [publish(channel_out)] --> wait --> unsubscribe
//!                                                       |
//!                                          Delivered(payload) | TimedOut
//! ```

mod slot;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::bus::{BrokerPort, SubscriptionId};
use crate::config::{require_channel, ConfigError};
use crate::error::Result;

pub use slot::ResultSlot;
use slot::SlotHandler;

/// Outcome of one wait cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitResult {
    /// A message arrived on the inbound channel.
    Delivered(Bytes),
    /// The timeout elapsed first.
    TimedOut,
}

/// Validated wait parameters of a session.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Channel (pattern) responses arrive on.
    pub channel_in: String,
    /// Channel requests are published on; absent for the listen-only shape.
    pub channel_out: Option<String>,
    /// Upper bound for one wait; `None` (or zero) waits forever.
    pub timeout: Option<Duration>,
    /// Sampling granularity for the timeout check.
    pub poll_interval: Duration,
}

/// Per-instance state for running wait cycles against a broker.
///
/// Wait cycles take `&mut self`, so at most one is outstanding per session.
pub struct Session {
    broker: Arc<dyn BrokerPort>,
    config: WaitConfig,
    last_payload: Option<Bytes>,
}

impl Session {
    /// Create a session, rejecting empty channels and a zero poll interval.
    ///
    /// A zero timeout is treated like `None` and waits forever.
    pub fn new(
        broker: Arc<dyn BrokerPort>,
        mut config: WaitConfig,
    ) -> std::result::Result<Self, ConfigError> {
        require_channel("channel_in", &config.channel_in)?;
        if let Some(channel_out) = &config.channel_out {
            require_channel("channel_out", channel_out)?;
        }
        if config.poll_interval.is_zero() {
            return Err(ConfigError::InvalidPollInterval(0.0));
        }
        config.timeout = config.timeout.filter(|timeout| !timeout.is_zero());

        Ok(Self {
            broker,
            config,
            last_payload: None,
        })
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    pub fn broker(&self) -> &Arc<dyn BrokerPort> {
        &self.broker
    }

    /// Payload of the most recent delivered cycle.
    pub fn last_payload(&self) -> Option<&Bytes> {
        self.last_payload.as_ref()
    }

    /// Run one wait cycle.
    ///
    /// With `outbound` present the payload is published on `channel_out`
    /// after the inbound subscription is armed (call shape); without it the
    /// cycle only listens. Broker errors end the cycle immediately.
    #[tracing::instrument(
        name = "bridge.wait",
        skip_all,
        fields(channel_in = %self.config.channel_in, call = outbound.is_some())
    )]
    pub async fn wait_for_response(&mut self, outbound: Option<Bytes>) -> Result<WaitResult> {
        let channel_out = match (&outbound, &self.config.channel_out) {
            (Some(_), None) => return Err(ConfigError::MissingChannelOut.into()),
            (_, channel_out) => channel_out.clone(),
        };

        let slot = Arc::new(ResultSlot::new());
        let handler = Arc::new(SlotHandler::new(Arc::clone(&slot)));
        let id = self
            .broker
            .subscribe(&self.config.channel_in, handler)
            .await?;
        let _subscription = SubscriptionGuard {
            broker: self.broker.as_ref(),
            id,
        };
        debug!(subscription = %id, "Listener armed");

        let is_call = outbound.is_some();
        if let (Some(payload), Some(channel_out)) = (outbound, channel_out) {
            debug!(channel_out = %channel_out, bytes = payload.len(), "Sending request");
            self.broker.publish(&channel_out, payload).await?;
        }

        let start = Instant::now();
        let result = self.wait_on(&slot, start).await;

        let elapsed = start.elapsed().as_secs_f64();
        match &result {
            WaitResult::Delivered(payload) => {
                if is_call {
                    info!(elapsed, "Round trip time: {:.6} sec", elapsed);
                } else {
                    info!(elapsed, "Wait time: {:.6} sec", elapsed);
                }
                self.last_payload = Some(payload.clone());
            }
            WaitResult::TimedOut => {
                if is_call {
                    warn!(elapsed, "Timeout reached!");
                } else {
                    info!(elapsed, "Timeout reached!");
                }
            }
        }

        Ok(result)
    }

    /// Sleep in poll-interval steps until the slot is filled or time is up.
    ///
    /// A fill wakes the loop early; the last step is clipped to the deadline.
    async fn wait_on(&self, slot: &ResultSlot, start: Instant) -> WaitResult {
        loop {
            let nap = match self.config.timeout {
                Some(timeout) => self
                    .config
                    .poll_interval
                    .min(timeout.saturating_sub(start.elapsed())),
                None => self.config.poll_interval,
            };

            tokio::select! {
                _ = slot.filled() => {}
                _ = tokio::time::sleep(nap) => {}
            }

            if let Some(payload) = slot.take() {
                return WaitResult::Delivered(payload);
            }
            if let Some(timeout) = self.config.timeout {
                if start.elapsed() >= timeout {
                    return WaitResult::TimedOut;
                }
            }
        }
    }
}

/// Unsubscribes when dropped, whichever way the cycle ends.
struct SubscriptionGuard<'a> {
    broker: &'a dyn BrokerPort,
    id: SubscriptionId,
}

impl Drop for SubscriptionGuard<'_> {
    fn drop(&mut self) {
        self.broker.unsubscribe(self.id);
        debug!(subscription = %self.id, "Listener disarmed");
    }
}
