//! Mock implementations for testing

mod client;
mod server;

pub use client::{MockCall, MockVaultClient};
pub use server::{MockVaultServer, RecordedRequest};
