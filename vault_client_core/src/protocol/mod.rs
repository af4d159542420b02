//! Vault HTTP API Protocol Implementation
//!
//! - `client`: HTTP transport carrying the token and namespace headers
//! - `messages`: response bodies and their decoding
//! - `error`: transport and server error types

pub mod client;
pub mod error;
pub mod messages;

// Re-export main types
pub use client::HttpTransport;
pub use error::{ProtocolError, ResponseCode, Result};

/// API version prefix for every endpoint
pub const API_VERSION: &str = "v1";

/// Endpoint that installs a new key term in the keyring
pub const ROTATE_PATH: &str = "sys/rotate";

/// Endpoint that reports the active key term
pub const KEY_STATUS_PATH: &str = "sys/key-status";

/// Header carrying the client token
pub const TOKEN_HEADER: &str = "X-Vault-Token";

/// Header carrying the enterprise namespace
pub const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Header marking the request as coming from an API client
pub const REQUEST_HEADER: &str = "X-Vault-Request";

/// Build the path of an endpoint relative to the server address
pub fn endpoint(path: &str) -> String {
    format!("{API_VERSION}/{path}")
}
