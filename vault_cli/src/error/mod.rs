use colored::*;
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// CLI-specific error type with semantic exit codes
///
/// Every failure the `rotate` command can hit ends up here exactly once and
/// is rendered as a single line on stderr.
#[derive(Debug)]
pub struct CliError {
    /// The user-facing message
    message: String,

    /// Error category for exit code determination
    category: ErrorCategory,

    /// Whether the underlying failure is likely to go away on its own
    transient: bool,

    /// Source error if any
    source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Error categories that map to exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Unexpected arguments or flags
    Usage,
    /// The client could not be configured or constructed
    Connection,
    /// The rotate call failed
    Rotate,
    /// Rotation succeeded but reading the key status failed
    KeyStatus,
    /// Writing the report failed
    Output,
}

/// Semantic exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Usage = 1,
    Runtime = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Appended to key-status failures so the user knows the rotation happened
pub const ROTATED_NOTICE: &str = "the key was rotated, but its new status could not be confirmed";

impl CliError {
    fn new(message: String, category: ErrorCategory) -> Self {
        Self {
            message,
            category,
            transient: false,
            source: None,
        }
    }

    fn from_core(message: String, category: ErrorCategory, error: vault_client_core::Error) -> Self {
        Self {
            message,
            category,
            transient: error.is_transient(),
            source: Some(Box::new(error)),
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(message.into(), ErrorCategory::Usage)
    }

    /// Unexpected positional arguments
    pub fn too_many_arguments(got: usize) -> Self {
        Self::usage(format!("Too many arguments (expected 0, got {got})"))
    }

    /// Client construction failed; the message is shown verbatim
    pub fn connection(error: vault_client_core::Error) -> Self {
        Self::from_core(error.to_string(), ErrorCategory::Connection, error)
    }

    /// Configuration could not be loaded, so no client could be built
    pub fn config(error: anyhow::Error) -> Self {
        let mut cli_error = Self::new(format!("{error:#}"), ErrorCategory::Connection);
        cli_error.source = Some(error.into());
        cli_error
    }

    /// The rotate call failed
    pub fn rotate(error: vault_client_core::Error) -> Self {
        Self::from_core(
            format!("Error rotating key: {error}"),
            ErrorCategory::Rotate,
            error,
        )
    }

    /// The key-status call failed after a successful rotation
    pub fn key_status(error: vault_client_core::Error) -> Self {
        Self::from_core(
            format!("Error reading key status: {error} ({ROTATED_NOTICE})"),
            ErrorCategory::KeyStatus,
            error,
        )
    }

    /// Writing the report to stdout failed
    pub fn output(error: io::Error) -> Self {
        let mut cli_error = Self::new(
            format!("Error writing output: {error}"),
            ErrorCategory::Output,
        );
        cli_error.source = Some(Box::new(error));
        cli_error
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self.category {
            ErrorCategory::Usage => ExitCode::Usage,
            ErrorCategory::Connection
            | ErrorCategory::Rotate
            | ErrorCategory::KeyStatus
            | ErrorCategory::Output => ExitCode::Runtime,
        }
    }

    /// Format the error for user display, always on one line
    pub fn format_for_user(&self, use_color: bool) -> String {
        let line = single_line(&self.message);
        if use_color {
            line.red().to_string()
        } else {
            line
        }
    }

    /// Log the source chain at debug level
    pub fn log_details(&self) {
        log::debug!(
            "{:?} failure (transient: {}): {}",
            self.category,
            self.transient,
            self.message
        );
        let mut current = self.source.as_deref().map(|e| e as &(dyn StdError + 'static));
        let mut level = 1;
        while let Some(err) = current {
            log::debug!("  caused by {level}: {err}");
            current = err.source();
            level += 1;
        }
    }
}

/// Collapse a possibly multi-line message onto a single line
fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for CliError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
