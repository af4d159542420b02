//! Token storage that is wiped from memory when dropped

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that zeros its memory when dropped
///
/// Holds the Vault token between configuration and the request headers.
/// `Debug` and `Display` never print the contents.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: Vec<u8>,
}

impl SecureString {
    /// Create a new SecureString from a regular string
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            inner: s.into().into_bytes(),
        }
    }

    /// Create a SecureString from raw file contents, dropping surrounding whitespace
    ///
    /// Token helper files usually end with a newline that must not reach the
    /// request header.
    pub fn from_trimmed_bytes(mut bytes: Vec<u8>) -> Self {
        let start = bytes
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(bytes.len());
        let end = bytes
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(start, |i| i + 1);
        let inner = bytes[start..end].to_vec();
        bytes.zeroize();
        Self { inner }
    }

    /// Get the string as a byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Try to get the string as a str reference
    pub fn to_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.inner)
    }

    /// Whether nothing (or only whitespace) was stored
    pub fn is_blank(&self) -> bool {
        self.inner.iter().all(|b| b.is_ascii_whitespace())
    }

    /// Constant-time comparison
    pub fn constant_time_eq(&self, other: &Self) -> bool {
        if self.inner.len() != other.inner.len() {
            return false;
        }

        self.inner
            .iter()
            .zip(other.inner.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString(***)")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        self.constant_time_eq(other)
    }
}

impl Eq for SecureString {}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_are_redacted() {
        let secure = SecureString::new("s.9Xv2k1");
        assert_eq!(format!("{secure:?}"), "SecureString(***)");
        assert_eq!(format!("{secure}"), "***");
    }

    #[test]
    fn test_from_trimmed_bytes() {
        let secure = SecureString::from_trimmed_bytes(b"  hvs.token-value\n".to_vec());
        assert_eq!(secure.to_str().unwrap(), "hvs.token-value");
    }

    #[test]
    fn test_from_trimmed_bytes_all_whitespace() {
        let secure = SecureString::from_trimmed_bytes(b" \n\t".to_vec());
        assert!(secure.is_blank());
        assert!(secure.as_bytes().is_empty());
    }

    #[test]
    fn test_constant_time_comparison() {
        let a = SecureString::new("root");
        let b = SecureString::from("root");
        let c = SecureString::new("toor");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.constant_time_eq(&SecureString::new("roots")));
    }
}
