//! Backoff builders.

use std::time::Duration;

use backon::ExponentialBuilder;

/// Attempts made before the broker is considered unreachable.
pub const CONNECT_ATTEMPTS: usize = 20;

/// Backoff for reaching the broker when a binary starts.
///
/// Starts at 250ms and caps at 10s between jittered attempts. Wait cycles
/// never use this.
pub fn connection_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(250))
        .with_max_delay(Duration::from_secs(10))
        .with_max_times(CONNECT_ATTEMPTS)
        .with_jitter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use backon::BackoffBuilder;

    #[test]
    fn test_connection_backoff_is_bounded() {
        let delays: Vec<Duration> = connection_backoff().build().collect();

        assert_eq!(delays.len(), CONNECT_ATTEMPTS);
        assert!(delays.iter().all(|d| *d >= Duration::from_millis(250)));
    }
}
