//! Core API module for the Vault client
//!
//! `KeyAdmin` is the narrow contract commands use to reach the server's
//! keyring administration endpoints. `VaultClient` implements it over HTTP;
//! tests substitute their own implementation.

use crate::protocol::messages::parse_key_status;
use crate::protocol::{HttpTransport, KEY_STATUS_PATH, ROTATE_PATH};
use crate::security::TokenHelper;
use crate::{ClientConfig, Result, error::ValidationError};
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Snapshot of the server's active encryption key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStatus {
    /// Generation of the active key; rotation increments it
    pub term: u32,
    /// When the active term was installed
    pub install_time: DateTime<Utc>,
    /// Encryptions performed with the active term, when the server reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryptions: Option<u64>,
}

/// Keyring administration operations exposed by the server
#[async_trait::async_trait]
pub trait KeyAdmin: Send + Sync {
    /// Ask the server to install a new key term
    ///
    /// Success carries no data; call `key_status` to observe the new term.
    async fn rotate(&self) -> Result<()>;

    /// Read the active key term and its install time
    async fn key_status(&self) -> Result<KeyStatus>;
}

/// HTTP client for a Vault server
#[derive(Debug)]
pub struct VaultClient {
    transport: HttpTransport,
}

impl VaultClient {
    /// Build a client from connection options
    ///
    /// Falls back to `~/.vault-token` when the options carry no token.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_token_helper(config, &TokenHelper::default())
    }

    /// Build a client, consulting `helper` when the options carry no token
    pub fn with_token_helper(config: &ClientConfig, helper: &TokenHelper) -> Result<Self> {
        let token = match config.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => crate::SecureString::new(token),
            _ => helper.get()?.ok_or(ValidationError::MissingToken)?,
        };

        debug!("Creating Vault client for {}", config.address);
        let transport = HttpTransport::new(config, token)?;
        Ok(Self { transport })
    }

    /// Address requests are sent to
    pub fn address(&self) -> &str {
        self.transport.base_url().as_str()
    }
}

#[async_trait::async_trait]
impl KeyAdmin for VaultClient {
    async fn rotate(&self) -> Result<()> {
        self.transport.send(Method::PUT, ROTATE_PATH).await?;
        Ok(())
    }

    async fn key_status(&self) -> Result<KeyStatus> {
        let body = self.transport.send(Method::GET, KEY_STATUS_PATH).await?;
        Ok(parse_key_status(&body)?)
    }
}
