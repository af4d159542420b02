//! Security module for token handling
//!
//! Tokens live in `SecureString` from the moment they are resolved until the
//! client is dropped.

pub mod secure_string;
pub mod token_helper;

// Re-export main types
pub use secure_string::SecureString;
pub use token_helper::TokenHelper;
