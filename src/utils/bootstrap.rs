//! Bootstrap utilities for courier binaries.

use std::future::Future;

use backon::Retryable;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::retry::connection_backoff;
use crate::config::LOG_ENV_VAR;

/// Initialize tracing with the COURIER_LOG environment variable.
///
/// Defaults to "info" level if COURIER_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect to the broker with exponential backoff retry.
///
/// Only meant for startup; wait cycles never retry.
pub async fn connect_with_retry<T, E, F, Fut>(address: &str, connect: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let connected = connect
        .retry(connection_backoff())
        .notify(|err: &E, delay| {
            warn!(address, error = %err, ?delay, "Failed to connect to broker, retrying");
        })
        .await?;
    info!(address, "Connected to broker");
    Ok(connected)
}
