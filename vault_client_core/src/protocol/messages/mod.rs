//! Response bodies of the Vault HTTP API
//!
//! The key-status endpoint has answered with its fields at the top level on
//! older servers and nested under `data` on newer ones, sometimes both. The
//! nested form wins when present.

use crate::api::KeyStatus;
use crate::protocol::error::{ProtocolError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Fields of a key-status answer
#[derive(Debug, Clone, Deserialize)]
pub struct KeyStatusData {
    pub term: u32,
    pub install_time: DateTime<Utc>,
    #[serde(default)]
    pub encryptions: Option<u64>,
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

impl From<KeyStatusData> for KeyStatus {
    fn from(data: KeyStatusData) -> Self {
        KeyStatus {
            term: data.term,
            install_time: data.install_time,
            encryptions: data.encryptions,
        }
    }
}

/// Decode the body of `GET /v1/sys/key-status`
pub fn parse_key_status(body: &[u8]) -> Result<KeyStatus> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ProtocolError::decoding(format!("key status is not valid JSON: {e}")))?;

    let fields = match value.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ => value,
    };

    let data: KeyStatusData = serde_json::from_value(fields)
        .map_err(|e| ProtocolError::decoding(format!("unexpected key status format: {e}")))?;

    Ok(data.into())
}

/// Decode the `errors` list of a failed request
///
/// Bodies that are empty or not JSON yield no messages; the status code alone
/// then describes the failure.
pub fn parse_errors(body: &[u8]) -> Vec<String> {
    if body.is_empty() {
        return Vec::new();
    }

    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(response) => response.errors,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() { Vec::new() } else { vec![text] }
        }
    }
}
