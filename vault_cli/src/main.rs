use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::str::FromStr;
use vault_cli::commands::{self, RotateCommand};
use vault_cli::config::ConfigManager;
use vault_cli::error::ExitCode;
use vault_cli::terminal;

#[derive(Debug, Parser)]
#[command(name = "vault")]
#[command(author, version, about = "Vault administration client", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rotate the backend encryption key
    Rotate(RotateCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures
            let code = if e.use_stderr() {
                ExitCode::Usage
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            return code.into();
        }
    };

    init_logging();

    let result = match cli.command {
        Commands::Rotate(command) => commands::rotate::execute(command).await,
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            e.log_details();
            let use_color = terminal::use_stderr_color(color_enabled());
            // stderr's capability was checked above, not stdout's
            colored::control::set_override(use_color);
            eprintln!("{}", e.format_for_user(use_color));
            e.exit_code().into()
        }
    }
}

/// `[output] color_enabled` from the layered configuration
///
/// Falls back to the default when the configuration itself failed to load.
fn color_enabled() -> bool {
    ConfigManager::new()
        .load()
        .map(|config| config.output.color_enabled)
        .unwrap_or(true)
}

/// Initialize logging
///
/// `RUST_LOG` takes the usual env_logger syntax. `VAULT_LOG` sets one level
/// for this workspace's crates and adds timestamps.
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if let Some(level) = std::env::var("VAULT_LOG")
        .ok()
        .and_then(|value| log::LevelFilter::from_str(value.trim()).ok())
    {
        builder
            .filter_module("vault_client_core", level)
            .filter_module("vault_cli", level)
            .filter_module("vault", level)
            .format_timestamp_millis();
    }

    builder.init();
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rotate_subcommand_parses() {
        let cli = Cli::try_parse_from(["vault", "rotate", "--namespace", "ops"]).unwrap();
        match cli.command {
            Commands::Rotate(command) => {
                assert_eq!(command.connection.namespace.as_deref(), Some("ops"));
                assert!(command.extra_args.is_empty());
            }
            Commands::Completions { .. } => panic!("Expected rotate"),
        }
    }

    #[test]
    fn test_help_is_not_a_usage_error() {
        let err = Cli::try_parse_from(["vault", "rotate", "--help"]).unwrap_err();
        assert!(!err.use_stderr());

        let err = Cli::try_parse_from(["vault", "rotate", "--bogus"]).unwrap_err();
        assert!(err.use_stderr());
    }
}
