//! Broker port for publish/subscribe messaging.
//!
//! This module contains:
//! - `BrokerPort` trait: the minimal capability the bridge depends on
//! - `MessageHandler` trait: callback invoked by broker-managed dispatch
//! - `SubscriptionTable`: bookkeeping for live dispatch tasks
//! - Implementations: in-memory channel, Redis, Mock

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

pub mod channel;
pub mod mock;
#[cfg(feature = "redis")]
pub mod redis;
mod subscriptions;

// Re-exports
pub use channel::ChannelBroker;
pub use mock::MockBroker;
#[cfg(feature = "redis")]
pub use self::redis::RedisBroker;
pub use subscriptions::SubscriptionTable;

// ============================================================================
// Traits
// ============================================================================

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;

/// Errors that can occur during bus operations.
///
/// All variants are fatal for the caller: the bridge never retries them.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Publish to '{channel}' failed: {message}")]
    Publish { channel: String, message: String },

    #[error("Subscribe to '{pattern}' failed: {message}")]
    Subscribe { pattern: String, message: String },
}

/// A message delivered on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Concrete channel the message was published on.
    pub channel: String,
    /// Raw payload bytes.
    pub payload: Bytes,
}

/// Verdict returned by a handler after seeing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Keep the subscription armed.
    Continue,
    /// Stop dispatching for this subscription and release it.
    Release,
}

/// Handle identifying one live subscription on a broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Callback invoked from the broker's background dispatch context.
///
/// Handlers run off the caller's task, so anything they share with the
/// caller must be synchronized.
pub trait MessageHandler: Send + Sync {
    /// Handle one message. Returning `Delivery::Release` guarantees no
    /// further invocation for the same subscription.
    fn on_message(&self, message: Message) -> Delivery;
}

/// Publish/subscribe capability consumed by the bridge.
///
/// Implementations:
/// - `ChannelBroker`: in-process broadcast channel
/// - `RedisBroker`: Redis `PUBLISH`/`PSUBSCRIBE` (feature `redis`)
/// - `MockBroker`: instrumented wrapper for testing
#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Publish a payload on a channel.
    async fn publish(&self, channel: &str, payload: Bytes) -> Result<()>;

    /// Arm a handler on every channel matching `pattern`.
    ///
    /// Messages published after this returns are dispatched to `handler`
    /// asynchronously until it releases itself or `unsubscribe` is called.
    async fn subscribe(&self, pattern: &str, handler: Arc<dyn MessageHandler>)
        -> Result<SubscriptionId>;

    /// Disarm a subscription. Idempotent: unknown or already released
    /// handles are ignored.
    fn unsubscribe(&self, subscription: SubscriptionId);

    /// Number of subscriptions currently armed.
    fn active_subscriptions(&self) -> usize;
}

// ============================================================================
// Pattern matching
// ============================================================================

/// Check if a channel name matches a subscription pattern.
///
/// Follows Redis `PSUBSCRIBE` glob rules:
/// - `*` matches any sequence (including empty)
/// - `?` matches exactly one character
/// - `[abc]`, `[a-z]`, `[^a]` match character classes
/// - `\x` matches `x` literally
pub fn pattern_matches(pattern: &str, channel: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let channel: Vec<char> = channel.chars().collect();
    glob_match(&pattern, &channel)
}

fn glob_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // Position to resume from after the last `*`.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        let step = match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
                continue;
            }
            Some('?') => Some(1),
            Some('[') => match_class(&pattern[p..], text[t]),
            Some('\\') if p + 1 < pattern.len() => (pattern[p + 1] == text[t]).then_some(2),
            Some(c) => (*c == text[t]).then_some(1),
            None => None,
        };

        match step {
            Some(width) => {
                p += width;
                t += 1;
            }
            None => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

/// Match a `[...]` class at the start of `pattern`.
///
/// Returns the class width when `c` is a member. An unterminated class
/// falls back to a literal `[`.
fn match_class(pattern: &[char], c: char) -> Option<usize> {
    let Some(close) = pattern.iter().skip(1).position(|ch| *ch == ']') else {
        return (c == '[').then_some(1);
    };
    let body = &pattern[1..close + 1];
    let (negated, body) = match body.first() {
        Some('^') => (true, &body[1..]),
        _ => (false, body),
    };

    let mut member = false;
    let mut i = 0;
    while i < body.len() {
        if i + 2 < body.len() && body[i + 1] == '-' {
            let (lo, hi) = if body[i] <= body[i + 2] {
                (body[i], body[i + 2])
            } else {
                (body[i + 2], body[i])
            };
            member |= (lo..=hi).contains(&c);
            i += 3;
        } else {
            member |= body[i] == c;
            i += 1;
        }
    }

    (member != negated).then_some(close + 2)
}

#[cfg(test)]
mod tests;
