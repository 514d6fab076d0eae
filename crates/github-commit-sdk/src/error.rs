//! Error types for GitHub Git Data API operations.
//!
//! All operations in this crate fail with [`ApiError`], which classifies
//! failures for callers that need to distinguish configuration problems from
//! transient network or server conditions.

use thiserror::Error;

/// Errors returned by the GitHub Git Data API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource does not exist or is not accessible (404).
    #[error("Resource not found")]
    NotFound,

    /// The token was rejected by GitHub (401).
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The token lacks permission for the requested operation (403).
    #[error("Authorization failed")]
    AuthorizationFailed,

    /// GitHub returned an unexpected error response.
    #[error("GitHub API error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// Network connectivity or transport error.
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// A response body could not be deserialized.
    #[error("Failed to deserialize API response: {message}")]
    SerializationError { message: String },

    /// The client could not be constructed from its configuration.
    #[error("Invalid client configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed
    /// if retried.
    ///
    /// Server errors (5xx), rate limiting (429), and network failures are
    /// transient; everything else indicates a caller or configuration problem.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NotFound => false,
            Self::AuthenticationFailed => false,
            Self::AuthorizationFailed => false,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::NetworkError { .. } => true,
            Self::SerializationError { .. } => false,
            Self::InvalidConfiguration { .. } => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::SerializationError {
                message: error.to_string(),
            }
        } else {
            Self::NetworkError {
                message: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
