//! Courier - request/response over publish/subscribe
//!
//! Turns a fire-and-forget broker into a synchronous call with a bounded
//! wait, and provides the pipeline components that drive it: a listener
//! (reader), a call filter and a broadcaster (writer).

pub mod bridge;
pub mod bus;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod processors;
pub mod record;
pub mod registry;
pub mod utils;

pub use bridge::{Session, WaitConfig, WaitResult};
pub use error::{BridgeError, ProcessError, Result};
pub use policy::{CallShape, CallTimeoutAction, ListenTimeoutAction, TimeoutAction};
pub use record::Record;
