//! Validation related error types

use thiserror::Error;

/// Client configuration errors detected before any request is sent
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The server address cannot be used as a base URL
    #[error("Invalid Vault address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// No token was supplied through any configuration layer
    #[error(
        "No Vault token found: set VAULT_TOKEN, pass --token, or write one to ~/.vault-token"
    )]
    MissingToken,

    /// TLS material could not be loaded
    #[error("Invalid TLS configuration: {reason}")]
    InvalidTls { reason: String },
}

impl ValidationError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(message: &str) -> Self {
        Self::InvalidConfiguration {
            message: message.to_string(),
        }
    }

    /// Create an invalid address error
    pub fn invalid_address(address: &str, reason: &str) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid TLS error
    pub fn invalid_tls(reason: impl Into<String>) -> Self {
        Self::InvalidTls {
            reason: reason.into(),
        }
    }
}
