//! Default token helper: the `~/.vault-token` file
//!
//! When no token is configured explicitly, the client falls back to the file
//! that `vault login` writes. A missing file simply means "no token".

use super::SecureString;
use crate::error::IoError;
use log::debug;
use std::path::{Path, PathBuf};

/// File name of the token written by `vault login`
pub const TOKEN_FILE_NAME: &str = ".vault-token";

/// Reads a token from a file on disk
#[derive(Debug, Clone)]
pub struct TokenHelper {
    path: Option<PathBuf>,
}

impl Default for TokenHelper {
    fn default() -> Self {
        Self {
            path: dirs::home_dir().map(|home| home.join(TOKEN_FILE_NAME)),
        }
    }
}

impl TokenHelper {
    /// Token helper reading a specific file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Token helper that never finds a token
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// File this helper reads, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the stored token
    ///
    /// Returns `Ok(None)` when the file does not exist or is blank.
    pub fn get(&self) -> Result<Option<SecureString>, IoError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        match std::fs::read(path) {
            Ok(bytes) => {
                let token = SecureString::from_trimmed_bytes(bytes);
                if token.is_blank() {
                    debug!("Token helper file {} is empty", path.display());
                    Ok(None)
                } else {
                    debug!("Using token from {}", path.display());
                    Ok(Some(token))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No token helper file at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(IoError::from_std(e).with_path(path)),
        }
    }
}
