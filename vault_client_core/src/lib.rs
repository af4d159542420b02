//! Vault Client Core Library
//!
//! This is the core library for the Vault administration client. It provides
//! the connection options, the key-status model, the `KeyAdmin` contract used
//! by commands, and the HTTP client that implements it.

pub mod api;
pub mod error;
pub mod protocol;
pub mod security;

// Re-export main types
pub use api::{KeyAdmin, KeyStatus, VaultClient};
pub use error::{Error, Result};
pub use security::SecureString;

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Default address used when neither config, environment nor flags set one
pub const DEFAULT_ADDRESS: &str = "https://127.0.0.1:8200";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection options for reaching the Vault server
///
/// Every recognized connection/auth setting is an explicit field; there is no
/// other channel through which a command can influence client construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address including scheme, e.g. `https://vault.example.com:8200`
    pub address: String,
    /// Authentication token sent as `X-Vault-Token`
    pub token: Option<String>,
    /// Enterprise namespace sent as `X-Vault-Namespace`
    pub namespace: Option<String>,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// TLS settings
    pub tls: TlsConfig,
}

/// TLS options for the HTTP transport
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM-encoded CA bundle used to verify the server certificate
    pub ca_cert: Option<PathBuf>,
    /// Directory of PEM-encoded CA certificates
    pub ca_path: Option<PathBuf>,
    /// PEM-encoded client certificate for TLS authentication
    pub client_cert: Option<PathBuf>,
    /// PEM-encoded private key matching `client_cert`
    pub client_key: Option<PathBuf>,
    /// Disable verification of the server certificate
    #[serde(deserialize_with = "deserialize_flag")]
    pub skip_verify: bool,
}

/// Accept the boolean spellings environment variables use (`1`, `t`, `yes`...)
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(value) => Ok(value != 0),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "1" | "t" | "true" | "y" | "yes" => Ok(true),
            "" | "0" | "f" | "false" | "n" | "no" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean value '{other}'"
            ))),
        },
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            token: None,
            namespace: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            tls: TlsConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a test configuration
    pub fn test() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: Some("test-token".to_string()),
            namespace: None,
            timeout_seconds: 5,
            tls: TlsConfig::default(),
        }
    }

    /// Builder-style address override
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Builder-style token override
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
