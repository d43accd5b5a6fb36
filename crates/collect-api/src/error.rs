//! Error types for the backend API client.

use thiserror::Error;

/// Errors that can occur when calling the collection backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: no response was received (connect error, timeout,
    /// interrupted body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an HTTP error status. `detail` carries the
    /// human-readable message from the error body when one was present.
    #[error("backend error {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The configured base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// The server-provided detail string, if the backend reported one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Whether this error is a transport failure (nothing was received).
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Http(_))
    }
}
