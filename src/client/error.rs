//! Normalized API error.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error - please check your connection";
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// The single error shape surfaced by the client.
///
/// `status == 0` means no HTTP response was received (connect failure, timeout,
/// undecodable payload); any other value is the status returned by the server.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiError {
    /// Builds an error from a non-2xx response.
    ///
    /// The message is taken from a JSON `message` field when present.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let data = serde_json::from_slice::<Value>(body).ok();
        let message = data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
            .to_string();

        Self {
            message,
            status,
            data,
        }
    }

    /// No response was received.
    pub fn network() -> Self {
        Self {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            status: 0,
            data: None,
        }
    }

    /// Anything else that prevented a usable result.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 0,
            data: None,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.status == 0
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            Self::network()
        } else {
            Self::unexpected(e.to_string())
        }
    }
}
