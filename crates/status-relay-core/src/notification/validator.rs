//! SNS payload signature verification.
//!
//! SNS signs each delivery with RSA PKCS#1 v1.5 over a canonical string built
//! from a fixed, kind-dependent set of envelope fields. The signing
//! certificate is published at an HTTPS URL carried in the payload itself,
//! which is why the certificate URL must be checked against the SNS service
//! domain before anything is fetched: an attacker who controls that URL
//! controls the verification key.
//!
//! Certificates are cached per process, keyed by URL. A certificate URL is
//! immutable once published, so the cache needs no TTL.

use std::collections::HashMap;
use std::sync::RwLock;

use base64::Engine;
use regex::Regex;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha1::Sha1;
use sha2::Sha256;
use tracing::{debug, instrument, warn};
use url::Url;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

use crate::notification::{
    NotificationKind, NotificationPayload, PayloadValidator, ValidatedNotification,
    ValidationError,
};

/// Hosts allowed to serve signing certificates, e.g.
/// `sns.us-east-1.amazonaws.com`.
const CERT_HOST_PATTERN: &str = r"^sns\.[a-zA-Z0-9\-]{3,}\.amazonaws\.com(\.cn)?$";

/// Digest algorithm selected by the envelope's `SignatureVersion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignatureVersion {
    /// SHA1 with RSA.
    V1,
    /// SHA256 with RSA.
    V2,
}

impl SignatureVersion {
    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "1" => Ok(Self::V1),
            "2" => Ok(Self::V2),
            other => Err(ValidationError::MalformedPayload {
                message: format!("unsupported SignatureVersion {}", other),
            }),
        }
    }
}

/// Production [`PayloadValidator`] implementing the SNS signing scheme.
///
/// # Examples
///
/// ```rust,no_run
/// use status_relay_core::notification::{PayloadValidator, SnsPayloadValidator};
///
/// # async fn example(body: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
/// let validator = SnsPayloadValidator::new();
/// let notification = validator.validate(body).await?;
/// println!("kind: {}", notification.kind);
/// # Ok(())
/// # }
/// ```
pub struct SnsPayloadValidator {
    http_client: reqwest::Client,
    cert_host: Regex,
    cert_cache: RwLock<HashMap<String, RsaPublicKey>>,
}

impl SnsPayloadValidator {
    /// Create a validator with its own HTTP client for certificate fetches.
    pub fn new() -> Self {
        Self::with_http_client(reqwest::Client::new())
    }

    /// Create a validator sharing an existing HTTP connection pool.
    pub fn with_http_client(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            cert_host: Regex::new(CERT_HOST_PATTERN).expect("certificate host pattern compiles"),
            cert_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Check that the signing-certificate URL belongs to the SNS service.
    ///
    /// Requires HTTPS, a host matching the SNS endpoint pattern, and a
    /// `.pem` path.
    fn check_certificate_url(&self, raw_url: &str) -> Result<(), ValidationError> {
        let untrusted = || ValidationError::UntrustedCertificate {
            url: raw_url.to_string(),
        };

        let parsed = Url::parse(raw_url).map_err(|_| untrusted())?;
        if parsed.scheme() != "https" {
            return Err(untrusted());
        }
        let host = parsed.host_str().ok_or_else(untrusted)?;
        if !self.cert_host.is_match(host) {
            return Err(untrusted());
        }
        if !parsed.path().ends_with(".pem") {
            return Err(untrusted());
        }
        Ok(())
    }

    /// Resolve the verification key for a certificate URL, from cache or by
    /// fetching the certificate.
    async fn signing_key(&self, cert_url: &str) -> Result<RsaPublicKey, ValidationError> {
        if let Some(key) = self
            .cert_cache
            .read()
            .expect("certificate cache lock poisoned")
            .get(cert_url)
        {
            debug!(cert_url = %cert_url, "Signing certificate served from cache");
            return Ok(key.clone());
        }

        let response = self
            .http_client
            .get(cert_url)
            .send()
            .await
            .map_err(|e| ValidationError::CertificateFetchFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ValidationError::CertificateFetchFailed {
                message: format!("certificate endpoint returned {}", status),
            });
        }

        let pem = response
            .text()
            .await
            .map_err(|e| ValidationError::CertificateFetchFailed {
                message: e.to_string(),
            })?;

        let key = parse_certificate(&pem)?;

        self.cert_cache
            .write()
            .expect("certificate cache lock poisoned")
            .insert(cert_url.to_string(), key.clone());

        debug!(cert_url = %cert_url, "Signing certificate fetched and cached");
        Ok(key)
    }
}

impl Default for SnsPayloadValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PayloadValidator for SnsPayloadValidator {
    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    async fn validate(&self, payload: &[u8]) -> Result<ValidatedNotification, ValidationError> {
        let envelope: NotificationPayload =
            serde_json::from_slice(payload).map_err(|e| ValidationError::MalformedPayload {
                message: format!("payload is not a valid SNS envelope: {}", e),
            })?;

        let kind = NotificationKind::from_type(&envelope.kind).ok_or_else(|| {
            ValidationError::MalformedPayload {
                message: format!("unrecognized Type {}", envelope.kind),
            }
        })?;

        let version = SignatureVersion::parse(&envelope.signature_version)?;
        let canonical = canonical_string(kind, &envelope)?;

        let signature = envelope
            .signature
            .as_deref()
            .ok_or_else(|| ValidationError::missing_field("Signature"))?;
        let cert_url = envelope
            .signing_cert_url
            .as_deref()
            .ok_or_else(|| ValidationError::missing_field("SigningCertURL"))?;

        self.check_certificate_url(cert_url)?;
        let key = self.signing_key(cert_url).await?;

        if let Err(error) = verify_signature(version, &canonical, signature, &key) {
            warn!(kind = %kind, "Rejecting payload with unverifiable signature");
            return Err(error);
        }

        // Presence is guaranteed by canonical_string for the fields it uses.
        let message = envelope.message.unwrap_or_default();
        Ok(ValidatedNotification {
            kind,
            message,
            subscribe_url: envelope.subscribe_url,
        })
    }
}

// ============================================================================
// Signing scheme
// ============================================================================

/// Build the canonical string SNS signs.
///
/// Fields are serialized as `Name\nValue\n` pairs in a fixed order that
/// differs by kind; `Subject` participates only when present on a data
/// message.
fn canonical_string(
    kind: NotificationKind,
    envelope: &NotificationPayload,
) -> Result<String, ValidationError> {
    let field = |value: &Option<String>, name: &str| -> Result<String, ValidationError> {
        value
            .clone()
            .ok_or_else(|| ValidationError::missing_field(name))
    };

    let mut pairs: Vec<(&str, String)> = Vec::new();
    match kind {
        NotificationKind::Notification => {
            pairs.push(("Message", field(&envelope.message, "Message")?));
            pairs.push(("MessageId", field(&envelope.message_id, "MessageId")?));
            if let Some(subject) = &envelope.subject {
                pairs.push(("Subject", subject.clone()));
            }
            pairs.push(("Timestamp", field(&envelope.timestamp, "Timestamp")?));
            pairs.push(("TopicArn", field(&envelope.topic_arn, "TopicArn")?));
            pairs.push(("Type", envelope.kind.clone()));
        }
        NotificationKind::SubscriptionConfirmation | NotificationKind::UnsubscribeConfirmation => {
            pairs.push(("Message", field(&envelope.message, "Message")?));
            pairs.push(("MessageId", field(&envelope.message_id, "MessageId")?));
            pairs.push((
                "SubscribeURL",
                field(&envelope.subscribe_url, "SubscribeURL")?,
            ));
            pairs.push(("Timestamp", field(&envelope.timestamp, "Timestamp")?));
            pairs.push(("Token", field(&envelope.token, "Token")?));
            pairs.push(("TopicArn", field(&envelope.topic_arn, "TopicArn")?));
            pairs.push(("Type", envelope.kind.clone()));
        }
    }

    let mut canonical = String::new();
    for (name, value) in pairs {
        canonical.push_str(name);
        canonical.push('\n');
        canonical.push_str(&value);
        canonical.push('\n');
    }
    Ok(canonical)
}

/// Verify the base64 signature over the canonical string.
fn verify_signature(
    version: SignatureVersion,
    canonical: &str,
    signature_b64: &str,
    key: &RsaPublicKey,
) -> Result<(), ValidationError> {
    let signature_bytes = base64::engine::general_purpose::STANDARD
        .decode(signature_b64)
        .map_err(|_| ValidationError::MalformedPayload {
            message: "Signature is not valid base64".to_string(),
        })?;

    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(|_| ValidationError::InvalidSignature)?;

    let verified = match version {
        SignatureVersion::V1 => {
            VerifyingKey::<Sha1>::new(key.clone()).verify(canonical.as_bytes(), &signature)
        }
        SignatureVersion::V2 => {
            VerifyingKey::<Sha256>::new(key.clone()).verify(canonical.as_bytes(), &signature)
        }
    };

    verified.map_err(|_| ValidationError::InvalidSignature)
}

/// Extract the RSA public key from a PEM-encoded X.509 certificate.
fn parse_certificate(pem: &str) -> Result<RsaPublicKey, ValidationError> {
    let certificate =
        Certificate::from_pem(pem.as_bytes()).map_err(|e| ValidationError::InvalidCertificate {
            message: e.to_string(),
        })?;

    let spki_der = certificate
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| ValidationError::InvalidCertificate {
            message: e.to_string(),
        })?;

    RsaPublicKey::from_public_key_der(&spki_der).map_err(|e| {
        ValidationError::InvalidCertificate {
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
