//! `vault rotate`: install a new encryption key term
//!
//! The command takes no arguments of its own. It validates that nothing but
//! connection flags were given, resolves the client configuration, then hands
//! a built client to [`RotateOrchestrator`].

use super::ConnectionArgs;
use crate::config::{AppConfig, ConfigManager};
use crate::error::{CliError, CliResult};
use crate::orchestrators::RotateOrchestrator;
use crate::terminal;
use clap::Parser;
use log::debug;
use std::io::Write;
use vault_client_core::{ClientConfig, KeyAdmin, KeyStatus, VaultClient};

const ROTATE_LONG_ABOUT: &str = "\
Rotates the encryption key that protects data written to the storage backend.

A new key term is installed in the keyring. New data is encrypted with it,
while older terms stay in the keyring to decrypt data written before the
rotation. Rotation happens online and causes no downtime.

Rotation applies to the whole cluster: servers in HA mode share one storage
backend, so run the command once per cluster, not once per server.

After rotating, the new key status is read back and printed.

Example:

    $ vault rotate";

/// Rotate the backend encryption key
#[derive(Debug, Clone, Parser)]
#[command(name = "rotate", long_about = ROTATE_LONG_ABOUT)]
pub struct RotateCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Positional arguments; the command accepts none
    #[arg(hide = true, value_name = "ARGS")]
    pub extra_args: Vec<String>,
}

impl RotateCommand {
    /// Reject positional arguments
    pub fn validate(&self) -> CliResult<()> {
        if !self.extra_args.is_empty() {
            return Err(CliError::too_many_arguments(self.extra_args.len()));
        }
        Ok(())
    }

    /// Layered configuration with this command's flags applied on top
    pub fn resolve_config(&self, manager: &ConfigManager) -> CliResult<AppConfig> {
        let mut config = manager.load().map_err(CliError::config)?;
        config.apply_cli_overrides(&self.connection);
        Ok(config)
    }
}

/// Execute the rotate command against the configured server, reporting on stdout
pub async fn execute(command: RotateCommand) -> CliResult<()> {
    let manager = ConfigManager::new();
    let mut stdout = std::io::stdout().lock();
    execute_with(&command, &manager, VaultClient::new, &mut stdout).await?;
    Ok(())
}

/// Execute the rotate command with an injected client constructor and writer
///
/// Validation happens before configuration is loaded or a client is built,
/// so a usage error never reaches the server.
pub async fn execute_with<C, F, W>(
    command: &RotateCommand,
    manager: &ConfigManager,
    build_client: F,
    out: &mut W,
) -> CliResult<KeyStatus>
where
    C: KeyAdmin,
    F: FnOnce(&ClientConfig) -> vault_client_core::Result<C>,
    W: Write + ?Sized,
{
    command.validate()?;

    let config = command.resolve_config(manager)?;
    debug!(
        "Connecting to {} (namespace: {:?})",
        config.client.address, config.client.namespace
    );

    let client = build_client(&config.client).map_err(CliError::connection)?;

    RotateOrchestrator::new(&client)
        .with_color(terminal::use_color(config.output.color_enabled))
        .run(out)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCategory, ExitCode};
    use crate::output::ROTATED_MESSAGE;
    use chrono::{TimeZone, Utc};
    use clap::error::ErrorKind;
    use serial_test::serial;
    use tempfile::TempDir;
    use vault_client_core::error::ValidationError;
    use vault_test_utils::{MockCall, MockVaultClient};

    fn parse(args: &[&str]) -> Result<RotateCommand, clap::Error> {
        RotateCommand::try_parse_from(std::iter::once("rotate").chain(args.iter().copied()))
    }

    fn isolated_manager(dir: &TempDir) -> ConfigManager {
        ConfigManager::with_path(dir.path().join("config.toml"))
    }

    #[test]
    fn test_no_arguments_is_valid() {
        let command = parse(&[]).unwrap();
        assert!(command.validate().is_ok());
        assert_eq!(command.connection, ConnectionArgs::default());
    }

    #[test]
    fn test_positional_arguments_are_counted() {
        let command = parse(&["foo", "bar", "baz"]).unwrap();
        let err = command.validate().unwrap_err();
        assert_eq!(err.message(), "Too many arguments (expected 0, got 3)");
        assert_eq!(err.exit_code(), ExitCode::Usage);
    }

    #[test]
    fn test_arguments_after_double_dash_are_positional() {
        let command = parse(&["--", "--force"]).unwrap();
        assert_eq!(
            command.validate().unwrap_err().message(),
            "Too many arguments (expected 0, got 1)"
        );
    }

    #[test]
    fn test_unknown_flag_is_a_parse_error() {
        let err = parse(&["--bogus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_connection_flags_are_parsed() {
        let command = parse(&[
            "--address",
            "https://vault.example.com:8200",
            "--token",
            "s.flag",
            "--namespace",
            "team-a",
            "--ca-cert",
            "/etc/vault/ca.pem",
            "--tls-skip-verify",
        ])
        .unwrap();

        assert!(command.validate().is_ok());
        let connection = &command.connection;
        assert_eq!(
            connection.address.as_deref(),
            Some("https://vault.example.com:8200")
        );
        assert_eq!(connection.token.as_deref(), Some("s.flag"));
        assert_eq!(connection.namespace.as_deref(), Some("team-a"));
        assert_eq!(
            connection.ca_cert.as_deref(),
            Some(std::path::Path::new("/etc/vault/ca.pem"))
        );
        assert!(connection.tls_skip_verify);
    }

    #[tokio::test]
    #[serial]
    async fn test_usage_error_makes_no_remote_calls() {
        let dir = TempDir::new().unwrap();
        let mock = MockVaultClient::new();
        let command = parse(&["extra"]).unwrap();
        let mut built = false;
        let mut out = Vec::new();

        let err = execute_with(
            &command,
            &isolated_manager(&dir),
            |_: &ClientConfig| {
                built = true;
                Ok(mock.clone())
            },
            &mut out,
        )
        .await
        .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Usage);
        assert!(!built);
        assert_eq!(mock.total_calls(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_client_build_failure_is_a_connection_error() {
        let dir = TempDir::new().unwrap();
        let command = parse(&[]).unwrap();
        let mut out = Vec::new();

        let err = execute_with(
            &command,
            &isolated_manager(&dir),
            |_: &ClientConfig| -> vault_client_core::Result<MockVaultClient> {
                Err(ValidationError::MissingToken.into())
            },
            &mut out,
        )
        .await
        .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Connection);
        assert_eq!(err.exit_code(), ExitCode::Runtime);
        assert_eq!(err.message(), ValidationError::MissingToken.to_string());
    }

    #[tokio::test]
    #[serial]
    async fn test_flags_reach_the_client_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[client]\naddress = \"https://from-file:8200\"\ntoken = \"s.file\"\n",
        )
        .unwrap();
        let command = parse(&["--address", "https://from-flag:8200"]).unwrap();
        let mock = MockVaultClient::new();
        let mut seen = None;
        let mut out = Vec::new();

        execute_with(
            &command,
            &isolated_manager(&dir),
            |config: &ClientConfig| {
                seen = Some(config.clone());
                Ok(mock.clone())
            },
            &mut out,
        )
        .await
        .unwrap();

        let seen = seen.unwrap();
        assert_eq!(seen.address, "https://from-flag:8200");
        assert_eq!(seen.token.as_deref(), Some("s.file"));
    }

    #[tokio::test]
    #[serial]
    async fn test_success_writes_report() {
        let dir = TempDir::new().unwrap();
        let mock = MockVaultClient::with_status(KeyStatus {
            term: 7,
            install_time: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
            encryptions: None,
        });
        let command = parse(&[]).unwrap();
        let mut out = Vec::new();

        let status = execute_with(
            &command,
            &isolated_manager(&dir),
            |_: &ClientConfig| Ok(mock.clone()),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(status.term, 7);
        assert_eq!(mock.calls(), vec![MockCall::Rotate, MockCall::KeyStatus]);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(&format!("{ROTATED_MESSAGE}\n\n")));
        assert!(text.contains("Key Term"));
    }
}
