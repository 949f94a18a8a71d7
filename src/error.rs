//! Errors surfaced by the bridge and its driving loops.

use crate::bus::BusError;
use crate::config::ConfigError;

/// Error raised by a Processor Hook, passed through untouched.
pub type ProcessError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that end a wait cycle or a driving loop.
///
/// A timeout is not an error; it is reported as `WaitResult::TimedOut`.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Broker unreachable or connection dropped. Never retried here.
    #[error("Broker error: {0}")]
    Connection(#[from] BusError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure inside the Processor Hook, with the original error as source.
    #[error("Processor failed: {0}")]
    Processor(#[source] ProcessError),
}

impl BridgeError {
    /// Recover the processor's own error, if this is one.
    pub fn into_processor_error(self) -> Option<ProcessError> {
        match self {
            BridgeError::Processor(e) => Some(e),
            _ => None,
        }
    }
}
