//! Error types for the skip API client.
//!
//! # Design
//! Three failure families reach the fetch layer: the server answered with a
//! non-2xx status, the request never completed, or the body was not the JSON
//! we expected. Each keeps the underlying message untouched so the string a
//! user sees matches what the transport or decoder reported. `ErrorKind`
//! lets callers branch on the family without matching message text.

use serde::Serialize;
use thiserror::Error;

/// Errors produced while building, executing or parsing skip API calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered outside the 2xx range.
    #[error("API Error: {status} {status_text}")]
    Status { status: u16, status_text: String },

    /// The request could not complete (DNS, connect, I/O).
    #[error("{0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("{0}")]
    Parse(String),

    /// The request could not be built from the given location.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Coarse category of an `ApiError`, preserved alongside its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Status,
    Transport,
    Parse,
    InvalidQuery,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Status { .. } => ErrorKind::Status,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Parse(_) => ErrorKind::Parse,
            ApiError::InvalidQuery(_) => ErrorKind::InvalidQuery,
        }
    }

    /// HTTP status for `Status` errors, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}
