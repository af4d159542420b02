//! Test utilities for the Vault administration client
//!
//! This crate provides a call-counting `KeyAdmin` fake and an in-process
//! HTTP server that answers like Vault's `sys/` endpoints.

pub mod mocks;

// Re-export commonly used types
pub use mocks::{MockCall, MockVaultClient, MockVaultServer, RecordedRequest};
