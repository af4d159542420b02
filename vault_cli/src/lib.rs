//! Vault command line interface
//!
//! The binary in `main.rs` is a thin shell around these modules: clap parses
//! the arguments, `commands` validates them and resolves the client
//! configuration, and the orchestrators drive the remote calls.

pub mod commands;
pub mod config;
pub mod error;
pub mod orchestrators;
pub mod output;
pub mod terminal;
