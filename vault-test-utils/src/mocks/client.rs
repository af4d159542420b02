//! Mock implementation of `KeyAdmin` for testing

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};
use vault_client_core::error::ProtocolError;
use vault_client_core::{Error, KeyAdmin, KeyStatus, Result};

/// Mock implementation of the key administration endpoints
///
/// Records every call in order so tests can assert on sequencing, and can be
/// told to fail either operation.
///
/// # Examples
///
/// ```rust,no_run
/// use vault_test_utils::MockVaultClient;
/// use vault_client_core::KeyAdmin;
///
/// # async fn example() {
/// let mock = MockVaultClient::new();
/// mock.expect_rotate_server_error(503, "Vault is sealed");
///
/// assert!(mock.rotate().await.is_err());
/// assert_eq!(mock.rotate_calls(), 1);
/// assert_eq!(mock.key_status_calls(), 0);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MockVaultClient {
    state: Arc<Mutex<MockState>>,
}

/// A call received by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCall {
    Rotate,
    KeyStatus,
}

#[derive(Debug, Default)]
struct MockState {
    rotate_result: Option<MockError>,
    key_status_result: Option<MockError>,
    status: Option<KeyStatus>,
    calls: Vec<MockCall>,
}

#[derive(Debug, Clone)]
enum MockError {
    Server { code: u16, message: String },
    Connection(String),
    Timeout,
}

impl From<MockError> for Error {
    fn from(mock_error: MockError) -> Self {
        let url = "http://127.0.0.1:8200/v1/sys".to_string();
        match mock_error {
            MockError::Server { code, message } => {
                Error::Protocol(ProtocolError::server_error(code, vec![message]))
            }
            MockError::Connection(message) => {
                Error::Protocol(ProtocolError::Connection { url, message })
            }
            MockError::Timeout => Error::Protocol(ProtocolError::Timeout { url }),
        }
    }
}

impl MockVaultClient {
    /// Create a new mock where both operations succeed
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that reports `status` after rotation
    pub fn with_status(status: KeyStatus) -> Self {
        let mock = Self::new();
        mock.set_key_status(status);
        mock
    }

    /// Key status returned when none was configured
    pub fn default_status() -> KeyStatus {
        KeyStatus {
            term: 2,
            install_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            encryptions: None,
        }
    }

    /// Configure the status returned by `key_status`
    pub fn set_key_status(&self, status: KeyStatus) {
        self.state.lock().unwrap().status = Some(status);
    }

    /// Make `rotate` fail with an HTTP error status
    pub fn expect_rotate_server_error(&self, code: u16, message: &str) {
        self.state.lock().unwrap().rotate_result = Some(MockError::Server {
            code,
            message: message.to_string(),
        });
    }

    /// Make `rotate` fail as if the server were unreachable
    pub fn expect_rotate_connection_error(&self, message: &str) {
        self.state.lock().unwrap().rotate_result =
            Some(MockError::Connection(message.to_string()));
    }

    /// Make `rotate` time out
    pub fn expect_rotate_timeout(&self) {
        self.state.lock().unwrap().rotate_result = Some(MockError::Timeout);
    }

    /// Make `key_status` fail with an HTTP error status
    pub fn expect_key_status_server_error(&self, code: u16, message: &str) {
        self.state.lock().unwrap().key_status_result = Some(MockError::Server {
            code,
            message: message.to_string(),
        });
    }

    /// Make `key_status` fail as if the connection dropped
    pub fn expect_key_status_connection_error(&self, message: &str) {
        self.state.lock().unwrap().key_status_result =
            Some(MockError::Connection(message.to_string()));
    }

    /// All calls received, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of `rotate` calls received
    pub fn rotate_calls(&self) -> usize {
        self.count(MockCall::Rotate)
    }

    /// Number of `key_status` calls received
    pub fn key_status_calls(&self) -> usize {
        self.count(MockCall::KeyStatus)
    }

    /// Total number of remote calls received
    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    fn count(&self, call: MockCall) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == call)
            .count()
    }
}

#[async_trait]
impl KeyAdmin for MockVaultClient {
    async fn rotate(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::Rotate);
        match state.rotate_result.clone() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    async fn key_status(&self) -> Result<KeyStatus> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::KeyStatus);
        match state.key_status_result.clone() {
            Some(err) => Err(err.into()),
            None => Ok(state
                .status
                .clone()
                .unwrap_or_else(MockVaultClient::default_status)),
        }
    }
}
