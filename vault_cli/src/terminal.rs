//! Terminal detection and capability utilities

use is_terminal::IsTerminal;
use std::env;
use std::io::{stderr, stdout};

/// Check if stdout is connected to an interactive terminal
pub fn is_interactive() -> bool {
    // Check if stdout is a terminal
    if !stdout().is_terminal() {
        return false;
    }

    // Check for CI environments that might have TTY but shouldn't be interactive
    if is_ci_environment() {
        return false;
    }

    true
}

/// Check if the terminal supports ANSI escape codes for colors
pub fn supports_ansi() -> bool {
    is_interactive() && term_supports_ansi()
}

/// Check if stderr is a terminal that supports ANSI escape codes
///
/// Independent of stdout, so `vault rotate 2>err.log` writes plain text to
/// the log. `NO_COLOR` is checked here because error lines bypass
/// `colored`'s own stdout-based detection.
pub fn stderr_supports_ansi() -> bool {
    if !stderr().is_terminal() || is_ci_environment() || no_color_requested() {
        return false;
    }
    term_supports_ansi()
}

/// Decide whether error lines on stderr should be colored
pub fn use_stderr_color(color_enabled: bool) -> bool {
    color_enabled && stderr_supports_ansi()
}

fn no_color_requested() -> bool {
    env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

fn term_supports_ansi() -> bool {
    let term = env::var("TERM").unwrap_or_default();
    if term == "dumb" {
        return false;
    }

    // Windows consoles without TERM still understand ANSI since Windows 10
    #[cfg(windows)]
    {
        true
    }

    #[cfg(not(windows))]
    {
        !term.is_empty()
    }
}

/// Decide whether output should be colored
///
/// Color needs both the configuration switch and a capable terminal.
/// `NO_COLOR`/`CLICOLOR_FORCE` are honored by `colored` itself.
pub fn use_color(color_enabled: bool) -> bool {
    color_enabled && supports_ansi()
}

/// Detect if running in a CI environment
fn is_ci_environment() -> bool {
    let ci_vars = [
        "CI",
        "CONTINUOUS_INTEGRATION",
        "JENKINS_URL",
        "GITHUB_ACTIONS",
        "GITLAB_CI",
        "BUILDKITE",
        "TEAMCITY_VERSION",
        "TF_BUILD", // Azure DevOps
    ];

    ci_vars.iter().any(|var| env::var(var).is_ok())
}
