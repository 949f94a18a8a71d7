//! Redis broker integration tests.
//!
//! Run with: cargo test --test bus_redis --features redis -- --ignored --nocapture
//!
//! Requires: REDIS_URI env var or Redis on localhost:6379
//!
//! Note: Tests use unique channel prefixes to avoid crosstalk between runs.

mod broker;

use std::sync::Arc;

use courier::bus::{BrokerPort, RedisBroker};
use courier::config::BrokerConfig;

fn redis_uri() -> String {
    std::env::var("REDIS_URI").unwrap_or_else(|_| "redis://localhost:6379".to_string())
}

fn test_prefix() -> String {
    format!(
        "test_{}",
        &uuid::Uuid::new_v4().to_string().replace('-', "")[..8]
    )
}

#[tokio::test]
#[ignore = "requires running Redis instance"]
async fn test_redis_broker() {
    println!("=== Redis BrokerPort Tests ===");
    println!("Connecting to: {}", redis_uri());

    let prefix = test_prefix();
    println!("Using test prefix: {}", prefix);

    let broker: Arc<dyn BrokerPort> = Arc::new(
        RedisBroker::from_url(&redis_uri())
            .await
            .expect("Failed to connect to Redis"),
    );

    run_broker_contract_tests!(&broker, &prefix);

    println!("=== All Redis BrokerPort tests PASSED ===");
}

#[tokio::test]
#[ignore = "requires running Redis instance"]
async fn test_redis_connect_from_config() {
    let config = BrokerConfig::default();

    let broker = RedisBroker::connect(&config)
        .await
        .expect("Failed to connect to Redis");

    assert_eq!(broker.active_subscriptions(), 0);
}
