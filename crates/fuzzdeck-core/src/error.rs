//! Error types for Fuzzdeck.
//!
//! Variants follow the failure taxonomy of a pull-based panel: the request
//! never reached the backend, the backend answered with a non-2xx status, or
//! the answer did not have the expected shape. Absent optional data is not an
//! error and is modelled with `Option` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Transport
    #[error("Request failed: {0}")]
    Transport(String),

    // Backend rejected the request
    #[error("{status} {reason}: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    // Unexpected response shape
    #[error("Malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Status text shown as the title of an error notification.
    pub fn status_text(&self) -> String {
        match self {
            Error::Status { status, reason, .. } => format!("{} {}", status, reason),
            Error::Transport(_) => "Network error".to_string(),
            Error::Decode { .. } => "Malformed response".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
            Error::InvalidInput(_) => "Invalid input".to_string(),
        }
    }

    /// Detail shown as the body of an error notification.
    pub fn detail(&self) -> String {
        match self {
            Error::Status { body, .. } => body.clone(),
            Error::Transport(msg)
            | Error::Serialization(msg)
            | Error::InvalidInput(msg) => msg.clone(),
            Error::Decode { endpoint, message } => format!("{}: {}", endpoint, message),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
