//! Error types for the Vault Client Core Library
//!
//! Errors are split by where they originate so that callers can tell a
//! misconfigured client apart from a failed remote operation.

use thiserror::Error;

pub mod io;
pub mod validation;

pub use self::io::{IoError, IoErrorKind};
pub use self::validation::ValidationError;
pub use crate::protocol::error::ProtocolError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Vault Client Core Library
///
/// - I/O errors: reading TLS material or the token helper file
/// - Protocol errors: the HTTP exchange with the server failed
/// - Validation errors: the client configuration is unusable
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error(transparent)]
    Io(#[from] IoError),

    /// Protocol related errors
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Validation related errors
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Whether the failure happened before any request reached the server
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Validation(_))
    }

    /// Whether the failure looks transient (network trouble, server busy)
    ///
    /// Used for diagnostics only; nothing in this workspace retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Protocol(err) => err.is_transient(),
            _ => false,
        }
    }
}

// Conversions from external error types

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io(IoError::from_std(source))
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Self::Protocol(ProtocolError::from(source))
    }
}
