//! Driving loops that put the bridge to work inside a pipeline.
//!
//! - `Listener` (reader): pulls externally produced data, one wait cycle per read
//! - `CallFilter` (filter): hands each item to an external responder and
//!   replaces it with the response
//! - `Broadcaster` (writer): publishes items without waiting
//!
//! Payload interpretation lives in the Processor Hook traits below; the
//! loops never look inside the bytes themselves.

mod broadcast;
mod call;
mod listener;

use bytes::Bytes;

use crate::error::ProcessError;

pub use broadcast::Broadcaster;
pub use call::CallFilter;
pub use listener::Listener;

/// Turns a payload received by a listener into output records.
pub trait ListenProcessor: Send {
    type Output;

    fn process(&mut self, payload: Bytes) -> Result<Vec<Self::Output>, ProcessError>;
}

/// Request encoding and response handling for the call shape.
pub trait CallProcessor: Send {
    type Item;

    /// Serialize an item into the outbound request payload.
    fn encode(&self, item: &Self::Item) -> Result<Bytes, ProcessError>;

    /// Combine the original item with the response payload.
    fn process(&mut self, item: Self::Item, payload: Bytes)
        -> Result<Vec<Self::Item>, ProcessError>;
}

/// Serializes items for fire-and-forget publishing.
pub trait PayloadEncoder: Send + Sync {
    type Item;

    fn encode(&self, item: &Self::Item) -> Result<Bytes, ProcessError>;
}
