//! Parameter-store access for runtime secrets.
//!
//! The relay keeps no secret material in configuration: the GitHub token and
//! the alert-topic ARN live in a managed parameter store and are fetched on
//! demand. Every call is a live fetch — no cache, no TTL — so a rotated
//! secret takes effect on the next request.

mod memory;
mod ssm;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryParameterStore;
pub use ssm::SsmParameterStore;

// ============================================================================
// Interface
// ============================================================================

/// Read-only access to named string parameters.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetch a parameter value by name.
    ///
    /// # Errors
    ///
    /// * [`ParameterStoreError::ParameterNotFound`] - no parameter with this name
    /// * [`ParameterStoreError::AccessDenied`] - insufficient permissions
    /// * [`ParameterStoreError::ServiceUnavailable`] - store unreachable
    async fn get_parameter(&self, name: &str) -> Result<String, ParameterStoreError>;
}

/// Parameter names the relay depends on.
pub struct WellKnownParameters;

impl WellKnownParameters {
    /// SNS topic ARN for alert publication.
    pub const ALERT_TOPIC_ARN: &'static str = "/sns/topic-arn/sns-payload-validator-errors";

    /// GitHub token used for status commits.
    pub const GITHUB_TOKEN: &'static str = "/github/token";
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during parameter-store operations.
#[derive(Debug, Error)]
pub enum ParameterStoreError {
    #[error("Parameter not found: {name}")]
    ParameterNotFound { name: String },

    #[error("Access denied to parameter {name}: {reason}")]
    AccessDenied { name: String, reason: String },

    #[error("Parameter store unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Parameter store internal error: {message}")]
    Internal { message: String },
}

impl ParameterStoreError {
    /// Check if the error is transient and might succeed on a later request.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable { .. } | Self::Internal { .. }
        )
    }

    /// Check if the error indicates a permission problem.
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
