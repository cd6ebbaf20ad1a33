//! Integration tests
//!
//! End-to-end flows across the queue store, connectivity observer, gateway
//! and coordinator.

pub mod gateway_test;
pub mod persistence_test;
pub mod store_test;
