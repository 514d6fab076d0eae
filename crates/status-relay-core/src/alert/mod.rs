//! Error alerting through the messaging service.
//!
//! When request handling fails, the dispatcher publishes a short alert
//! message to an SNS topic so operators hear about broken payloads without
//! watching logs. The topic ARN is resolved through the parameter store on
//! every call; alert publication itself is attempted exactly once, and a
//! failure propagates to the caller uncaught.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::secrets::{ParameterStore, ParameterStoreError, WellKnownParameters};

pub use memory::MemoryAlertPublisher;

// ============================================================================
// Interface
// ============================================================================

/// Best-effort delivery of operator alerts.
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    /// Publish an alert message.
    ///
    /// # Errors
    ///
    /// * [`AlertError::TopicLookupFailed`] - the alert-topic ARN could not be
    ///   resolved from the parameter store
    /// * [`AlertError::PublishFailed`] - the messaging service rejected the
    ///   publish call
    async fn alert(&self, message: &str) -> Result<(), AlertError>;
}

/// Errors that can occur while publishing an alert.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Failed to resolve alert topic: {0}")]
    TopicLookupFailed(#[from] ParameterStoreError),

    #[error("Failed to publish alert: {message}")]
    PublishFailed { message: String },
}

// ============================================================================
// SNS implementation
// ============================================================================

/// [`AlertPublisher`] backed by AWS SNS.
#[derive(Clone)]
pub struct SnsAlertPublisher {
    sns_client: aws_sdk_sns::Client,
    parameter_store: Arc<dyn ParameterStore>,
}

impl SnsAlertPublisher {
    /// Create a publisher from a configured SNS client and a parameter store
    /// holding the alert-topic ARN.
    pub fn new(sns_client: aws_sdk_sns::Client, parameter_store: Arc<dyn ParameterStore>) -> Self {
        Self {
            sns_client,
            parameter_store,
        }
    }
}

impl std::fmt::Debug for SnsAlertPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnsAlertPublisher").finish()
    }
}

#[async_trait]
impl AlertPublisher for SnsAlertPublisher {
    #[instrument(skip(self, message))]
    async fn alert(&self, message: &str) -> Result<(), AlertError> {
        let topic_arn = self
            .parameter_store
            .get_parameter(WellKnownParameters::ALERT_TOPIC_ARN)
            .await?;

        self.sns_client
            .publish()
            .topic_arn(&topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|sdk_error| {
                error!(topic_arn = %topic_arn, error = %sdk_error, "SNS publish failed");
                AlertError::PublishFailed {
                    message: sdk_error.to_string(),
                }
            })?;

        info!(topic_arn = %topic_arn, "Alert published");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
