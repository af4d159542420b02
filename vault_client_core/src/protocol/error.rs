//! Protocol-specific error types
//!
//! This module defines error types for the Vault HTTP API exchange.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Protocol-specific error types
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The request did not complete within the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// No connection could be established
    #[error("Failed to connect to {url}: {message}")]
    Connection { url: String, message: String },

    /// The request failed in transit for another reason
    #[error("Request failed: {message}")]
    Request { message: String },

    /// The server answered with a non-success status
    #[error("{}", format_server_error(*code, errors))]
    ServerError { code: u16, errors: Vec<String> },

    /// The response body could not be understood
    #[error("Invalid response from server: {message}")]
    Decoding { message: String },
}

impl ProtocolError {
    /// Create a server error
    pub fn server_error(code: u16, errors: Vec<String>) -> Self {
        Self::ServerError { code, errors }
    }

    /// Create a decoding error
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }

    /// Check if this error is transient
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Connection { .. }
                | Self::ServerError {
                    code: 429 | 500..=599,
                    ..
                }
        )
    }
}

impl From<reqwest::Error> for ProtocolError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());

        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::Connection {
                url,
                message: root_cause(&err),
            }
        } else if err.is_decode() {
            Self::decoding(error_chain(&err))
        } else {
            Self::Request {
                message: error_chain(&err),
            }
        }
    }
}

/// Join an error and its sources on one line
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}

/// Innermost error message, which for connect failures names the OS error
fn root_cause(err: &dyn StdError) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

fn format_server_error(code: u16, errors: &[String]) -> String {
    if errors.is_empty() {
        format!("Code: {code} ({})", ResponseCode(code).description())
    } else {
        let joined: Vec<String> = errors.iter().map(|e| e.replace('\n', " ")).collect();
        format!("Code: {code}. Errors: {}", joined.join("; "))
    }
}

/// HTTP status returned by the Vault server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCode(pub u16);

impl ResponseCode {
    /// Check if the response code indicates success
    pub fn is_success(&self) -> bool {
        matches!(self.0, 200..=299)
    }

    /// Get a human-readable description of the response code
    pub fn description(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            204 => "NO CONTENT",
            400 => "INVALID REQUEST",
            403 => "PERMISSION DENIED",
            404 => "INVALID PATH",
            405 => "UNSUPPORTED OPERATION",
            412 => "CONSISTENCY NOT YET REACHED",
            429 => "STANDBY OR RATE LIMITED",
            473 => "PERFORMANCE STANDBY",
            500 => "INTERNAL SERVER ERROR",
            502 => "REMOTE ERROR",
            503 => "VAULT IS SEALED OR DOWN FOR MAINTENANCE",
            _ => "UNKNOWN RESPONSE CODE",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.description())
    }
}
