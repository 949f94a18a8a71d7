//! Shared broker integration tests.
//!
//! Tests the BrokerPort contract and the bridge on top of it against every
//! implementation. Each implementation's test binary imports these test
//! functions and runs them.

pub mod contract_tests;
