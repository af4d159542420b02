//! Rotate command orchestrator
//!
//! Drives the two remote calls of a rotation strictly in order: `rotate`
//! must finish successfully before `key_status` is issued. Neither call is
//! retried.

use crate::error::{CliError, CliResult};
use crate::output::format_rotation_report;
use log::debug;
use std::io::Write;
use vault_client_core::{KeyAdmin, KeyStatus};

/// Orchestrator for the rotate command
///
/// Borrows an already-built client for the duration of one invocation.
pub struct RotateOrchestrator<'a, C: KeyAdmin + ?Sized> {
    client: &'a C,
    use_color: bool,
}

impl<'a, C: KeyAdmin + ?Sized> RotateOrchestrator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            use_color: false,
        }
    }

    /// Enable colored output in the report
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Rotate the key, then read back the new key status
    pub async fn rotate(&self) -> CliResult<KeyStatus> {
        debug!("Requesting key rotation");
        self.client.rotate().await.map_err(CliError::rotate)?;
        debug!("Key rotated, reading key status");

        let status = self
            .client
            .key_status()
            .await
            .map_err(CliError::key_status)?;
        debug!("Active key term is now {}", status.term);
        Ok(status)
    }

    /// Write the success report for `status`
    pub fn report<W: Write + ?Sized>(&self, status: &KeyStatus, out: &mut W) -> CliResult<()> {
        out.write_all(format_rotation_report(status, self.use_color).as_bytes())
            .and_then(|()| out.flush())
            .map_err(CliError::output)
    }

    /// Rotate, fetch the status and report it
    ///
    /// Nothing is written to `out` unless both calls succeed.
    pub async fn run<W: Write + ?Sized>(&self, out: &mut W) -> CliResult<KeyStatus> {
        let status = self.rotate().await?;
        self.report(&status, out)?;
        Ok(status)
    }
}
