//! Listen-only driving loop.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::stream::{self, Stream};
use tracing::{debug, info};

use super::ListenProcessor;
use crate::bridge::{Session, WaitConfig, WaitResult};
use crate::bus::BrokerPort;
use crate::config::{poll_interval_from_secs, timeout_from_secs, ConfigError, ListenerConfig};
use crate::error::{BridgeError, Result};
use crate::policy::{ListenOutcome, ListenTimeoutAction};

/// Reader that waits for externally published data.
///
/// Each `read` runs wait cycles until one delivers a message, then hands the
/// payload to the processor. On timeout the configured action either re-arms
/// (`keep-waiting`) or ends the input (`stop`).
pub struct Listener<P: ListenProcessor> {
    session: Session,
    action: ListenTimeoutAction,
    processor: P,
    finished: bool,
}

impl<P: ListenProcessor> Listener<P> {
    pub fn new(session: Session, action: ListenTimeoutAction, processor: P) -> Self {
        Self {
            session,
            action,
            processor,
            finished: false,
        }
    }

    /// Build a listener from raw configuration, validating it first.
    pub fn from_config(
        broker: Arc<dyn BrokerPort>,
        config: &ListenerConfig,
        processor: P,
    ) -> std::result::Result<Self, ConfigError> {
        let action: ListenTimeoutAction = config.timeout_action.parse()?;
        let session = Session::new(
            broker,
            WaitConfig {
                channel_in: config.channel_in.clone(),
                channel_out: None,
                timeout: timeout_from_secs(config.timeout_secs)?,
                poll_interval: poll_interval_from_secs(config.poll_interval_secs)?,
            },
        )?;

        info!(
            channel_in = %config.channel_in,
            timeout_action = %action,
            "Listener initialized"
        );

        Ok(Self::new(session, action, processor))
    }

    /// Whether a `stop` timeout ended the input.
    pub fn has_finished(&self) -> bool {
        self.finished
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Wait for the next message and return its records.
    ///
    /// Returns `None` once the input has ended.
    pub async fn read(&mut self) -> Result<Option<Vec<P::Output>>> {
        while !self.finished {
            match self.session.wait_for_response(None).await? {
                WaitResult::Delivered(payload) => {
                    let records = self
                        .processor
                        .process(payload)
                        .map_err(BridgeError::Processor)?;
                    debug!(records = records.len(), "Processed received data");
                    return Ok(Some(records));
                }
                WaitResult::TimedOut => match self.action.on_timeout() {
                    ListenOutcome::Retry => continue,
                    ListenOutcome::EndOfInput => self.finished = true,
                },
            }
        }
        Ok(None)
    }

    /// Lazy sequence of records, one wait cycle per delivered message.
    ///
    /// Ends after a `stop` timeout or after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<P::Output>> {
        stream::unfold(Some((self, VecDeque::new())), |state| async move {
            let (mut listener, mut pending) = state?;
            loop {
                if let Some(record) = pending.pop_front() {
                    return Some((Ok(record), Some((listener, pending))));
                }
                match listener.read().await {
                    Ok(Some(records)) => pending.extend(records),
                    Ok(None) => return None,
                    Err(e) => return Some((Err(e), None)),
                }
            }
        })
    }
}
