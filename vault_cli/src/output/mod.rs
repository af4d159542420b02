//! Human-readable rendering of command results

use chrono::{DateTime, SecondsFormat, Utc};
use colored::*;
use vault_client_core::KeyStatus;

/// First line printed after a successful rotation
pub const ROTATED_MESSAGE: &str = "Success! Rotated key";

const KEY_TERM_LABEL: &str = "Key Term";
const INSTALL_TIME_LABEL: &str = "Install Time";
const ENCRYPTIONS_LABEL: &str = "Encryption Count";

/// Gap between the label column and the value column
const COLUMN_GAP: usize = 4;

/// Render an install time the way the key-status block shows it
pub fn format_install_time(install_time: &DateTime<Utc>) -> String {
    install_time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Render a key status as an aligned two-column block
///
/// The encryption count row only appears when the server reported one.
/// There is no trailing newline.
pub fn format_key_status(status: &KeyStatus, use_color: bool) -> String {
    let mut rows = vec![
        (KEY_TERM_LABEL, status.term.to_string()),
        (INSTALL_TIME_LABEL, format_install_time(&status.install_time)),
    ];
    if let Some(encryptions) = status.encryptions {
        rows.push((ENCRYPTIONS_LABEL, encryptions.to_string()));
    }

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + COLUMN_GAP;

    rows.iter()
        .map(|(label, value)| {
            let padded = format!("{label:<width$}");
            if use_color {
                format!("{}{}", padded.bold(), value.cyan())
            } else {
                format!("{padded}{value}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full stdout report for a successful rotation, ending in a newline
pub fn format_rotation_report(status: &KeyStatus, use_color: bool) -> String {
    let headline = if use_color {
        ROTATED_MESSAGE.green().to_string()
    } else {
        ROTATED_MESSAGE.to_string()
    };
    format!("{headline}\n\n{}\n", format_key_status(status, use_color))
}
