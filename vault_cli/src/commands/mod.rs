//! Command definitions
//!
//! Each command owns its clap arguments and an `execute` entry point. The
//! connection flags are shared so every command that talks to the server
//! accepts the same set.

pub mod rotate;

pub use rotate::RotateCommand;

use clap::Args;
use std::path::PathBuf;

/// Flags controlling how the client reaches and authenticates to the server
///
/// Unset flags leave the value from the configuration file or environment
/// in place.
#[derive(Debug, Clone, Default, Args, PartialEq, Eq)]
#[command(next_help_heading = "Connection Options")]
pub struct ConnectionArgs {
    /// Address of the Vault server [env: VAULT_ADDR]
    #[arg(long, value_name = "URL")]
    pub address: Option<String>,

    /// Authentication token [env: VAULT_TOKEN]
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Enterprise namespace for the request [env: VAULT_NAMESPACE]
    #[arg(long, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// PEM-encoded CA certificate used to verify the server [env: VAULT_CACERT]
    #[arg(long, value_name = "FILE")]
    pub ca_cert: Option<PathBuf>,

    /// Directory of PEM-encoded CA certificates [env: VAULT_CAPATH]
    #[arg(long, value_name = "DIR")]
    pub ca_path: Option<PathBuf>,

    /// PEM-encoded client certificate for TLS authentication [env: VAULT_CLIENT_CERT]
    #[arg(long, value_name = "FILE")]
    pub client_cert: Option<PathBuf>,

    /// PEM-encoded private key for the client certificate [env: VAULT_CLIENT_KEY]
    #[arg(long, value_name = "FILE")]
    pub client_key: Option<PathBuf>,

    /// Disable verification of the server certificate [env: VAULT_SKIP_VERIFY]
    #[arg(long)]
    pub tls_skip_verify: bool,
}
