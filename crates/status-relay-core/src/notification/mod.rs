//! SNS notification payload model and validation contract.
//!
//! An SNS subscriber endpoint receives a signed JSON envelope per delivery.
//! Nothing downstream of the validator may touch the payload before its
//! signature has been verified; the validator is the single gate between the
//! raw HTTP body and the two-branch dispatch (confirmation fetch vs. status
//! forwarding).

mod validator;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use validator::SnsPayloadValidator;

// ============================================================================
// Payload Types
// ============================================================================

/// Kind tag carried in an SNS envelope's `Type` field.
///
/// Any other value is rejected as a malformed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A data message published to the topic.
    Notification,
    /// A subscribe handshake that must be confirmed by fetching its URL.
    SubscriptionConfirmation,
    /// An unsubscribe handshake, confirmed the same way.
    UnsubscribeConfirmation,
}

impl NotificationKind {
    /// Parse the `Type` field value.
    pub fn from_type(value: &str) -> Option<Self> {
        match value {
            "Notification" => Some(Self::Notification),
            "SubscriptionConfirmation" => Some(Self::SubscriptionConfirmation),
            "UnsubscribeConfirmation" => Some(Self::UnsubscribeConfirmation),
            _ => None,
        }
    }

    /// Whether this kind carries a confirmation URL that must be fetched.
    pub fn is_confirmation(&self) -> bool {
        matches!(
            self,
            Self::SubscriptionConfirmation | Self::UnsubscribeConfirmation
        )
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Notification => "Notification",
            Self::SubscriptionConfirmation => "SubscriptionConfirmation",
            Self::UnsubscribeConfirmation => "UnsubscribeConfirmation",
        };
        write!(f, "{}", value)
    }
}

/// Raw SNS envelope as delivered over HTTP.
///
/// Fields are optional at the serde layer; presence requirements depend on
/// the kind and are enforced by the validator, which reports the first
/// missing field as a [`ValidationError::MalformedPayload`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationPayload {
    #[serde(rename = "Type")]
    pub kind: String,
    pub message_id: Option<String>,
    pub topic_arn: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<String>,
    /// SNS omits the field on older topics; the service treats absence as
    /// version 1.
    #[serde(default = "default_signature_version")]
    pub signature_version: String,
    pub signature: Option<String>,
    #[serde(rename = "SigningCertURL")]
    pub signing_cert_url: Option<String>,
    #[serde(rename = "SubscribeURL")]
    pub subscribe_url: Option<String>,
    pub token: Option<String>,
}

fn default_signature_version() -> String {
    "1".to_string()
}

/// Result of successful signature verification.
///
/// Created per request, consumed immediately by the dispatcher, never
/// persisted.
#[derive(Debug, Clone)]
pub struct ValidatedNotification {
    pub kind: NotificationKind,
    pub message: String,
    /// Present only for confirmation kinds.
    pub subscribe_url: Option<String>,
}

// ============================================================================
// Validation Contract
// ============================================================================

/// Gate between raw HTTP bodies and dispatch.
///
/// Implementations must perform no side effects beyond fetching (and
/// caching) the signing certificate named by the payload.
#[async_trait]
pub trait PayloadValidator: Send + Sync {
    /// Verify the payload signature and produce the typed notification.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::MalformedPayload`] - required fields missing,
    ///   unrecognized kind tag, or unparseable JSON
    /// * [`ValidationError::InvalidSignature`] - signature does not verify
    /// * [`ValidationError::UntrustedCertificate`] - the signing-certificate
    ///   URL does not belong to the SNS service domain
    /// * [`ValidationError::CertificateFetchFailed`] /
    ///   [`ValidationError::InvalidCertificate`] - the certificate could not
    ///   be retrieved or parsed
    async fn validate(&self, payload: &[u8]) -> Result<ValidatedNotification, ValidationError>;
}

/// Errors produced while validating an inbound payload.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Payload signature does not verify against its signing certificate")]
    InvalidSignature,

    #[error("Signing certificate URL is not an SNS endpoint: {url}")]
    UntrustedCertificate { url: String },

    #[error("Failed to fetch signing certificate: {message}")]
    CertificateFetchFailed { message: String },

    #[error("Signing certificate could not be parsed: {message}")]
    InvalidCertificate { message: String },
}

impl ValidationError {
    /// Shorthand for a missing-field failure.
    pub(crate) fn missing_field(field: &str) -> Self {
        Self::MalformedPayload {
            message: format!("required field {} is missing", field),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
