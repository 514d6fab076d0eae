//! Tests for the SNS signing scheme: certificate-URL checks, canonical
//! string construction, and RSA verification with locally generated keys.

use super::*;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;

// ============================================================================
// Helpers
// ============================================================================

fn sample_envelope() -> NotificationPayload {
    serde_json::from_value(serde_json::json!({
        "Type": "Notification",
        "MessageId": "165545c9-2a5c-472c-8df2-7ff2be2b3b1b",
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:status-topic",
        "Subject": "deploy",
        "Message": "build ok",
        "Timestamp": "2024-01-01T00:00:00.000Z",
        "SignatureVersion": "1",
        "Signature": "ZmFrZQ==",
        "SigningCertURL": "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-abc123.pem"
    }))
    .expect("sample envelope deserializes")
}

fn confirmation_envelope() -> NotificationPayload {
    serde_json::from_value(serde_json::json!({
        "Type": "SubscriptionConfirmation",
        "MessageId": "165545c9-2a5c-472c-8df2-7ff2be2b3b1b",
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:status-topic",
        "Message": "You have chosen to subscribe to the topic",
        "Timestamp": "2024-01-01T00:00:00.000Z",
        "Token": "2336412f37",
        "SignatureVersion": "1",
        "Signature": "ZmFrZQ==",
        "SigningCertURL": "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-abc123.pem",
        "SubscribeURL": "https://sns.us-east-1.amazonaws.com/?Action=ConfirmSubscription"
    }))
    .expect("confirmation envelope deserializes")
}

/// Generate a small RSA key pair for signing tests. 1024 bits keeps test
/// runtime down; key size is irrelevant to the verification logic.
fn test_key_pair() -> (RsaPrivateKey, RsaPublicKey) {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, 1024).expect("key generation");
    let public_key = RsaPublicKey::from(&private_key);
    (private_key, public_key)
}

fn sign_v1(private_key: &RsaPrivateKey, canonical: &str) -> String {
    let signing_key = SigningKey::<Sha1>::new(private_key.clone());
    let signature = signing_key.sign(canonical.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(signature.to_bytes())
}

fn sign_v2(private_key: &RsaPrivateKey, canonical: &str) -> String {
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key.sign(canonical.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(signature.to_bytes())
}

// ============================================================================
// Certificate URL allowlist tests
// ============================================================================

mod certificate_url_tests {
    use super::*;

    #[test]
    fn test_sns_endpoint_accepted() {
        let validator = SnsPayloadValidator::new();
        assert!(validator
            .check_certificate_url(
                "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-abc.pem"
            )
            .is_ok());
    }

    #[test]
    fn test_china_partition_endpoint_accepted() {
        let validator = SnsPayloadValidator::new();
        assert!(validator
            .check_certificate_url(
                "https://sns.cn-north-1.amazonaws.com.cn/SimpleNotificationService-abc.pem"
            )
            .is_ok());
    }

    /// Plain HTTP must be rejected even for the right host.
    #[test]
    fn test_http_scheme_rejected() {
        let validator = SnsPayloadValidator::new();
        let result = validator.check_certificate_url(
            "http://sns.us-east-1.amazonaws.com/SimpleNotificationService-abc.pem",
        );
        assert!(matches!(
            result,
            Err(ValidationError::UntrustedCertificate { .. })
        ));
    }

    /// An attacker-controlled host must be rejected; this is the check that
    /// keeps the verification key out of the attacker's hands.
    #[test]
    fn test_foreign_host_rejected() {
        let validator = SnsPayloadValidator::new();
        for url in [
            "https://evil.example.com/SimpleNotificationService-abc.pem",
            "https://sns.us-east-1.amazonaws.com.evil.example.com/cert.pem",
            "https://snsxus-east-1.amazonaws.com/cert.pem",
        ] {
            let result = validator.check_certificate_url(url);
            assert!(
                matches!(result, Err(ValidationError::UntrustedCertificate { .. })),
                "{} should be rejected",
                url
            );
        }
    }

    #[test]
    fn test_non_pem_path_rejected() {
        let validator = SnsPayloadValidator::new();
        let result = validator
            .check_certificate_url("https://sns.us-east-1.amazonaws.com/SimpleNotificationService");
        assert!(matches!(
            result,
            Err(ValidationError::UntrustedCertificate { .. })
        ));
    }

    #[test]
    fn test_unparseable_url_rejected() {
        let validator = SnsPayloadValidator::new();
        let result = validator.check_certificate_url("not a url");
        assert!(matches!(
            result,
            Err(ValidationError::UntrustedCertificate { .. })
        ));
    }
}

// ============================================================================
// Canonical string tests
// ============================================================================

mod canonical_string_tests {
    use super::*;

    /// Data messages serialize Message, MessageId, Subject, Timestamp,
    /// TopicArn, Type in that order as Name\nValue\n pairs.
    #[test]
    fn test_notification_with_subject() {
        let envelope = sample_envelope();
        let canonical =
            canonical_string(NotificationKind::Notification, &envelope).expect("canonical");

        assert_eq!(
            canonical,
            "Message\nbuild ok\n\
             MessageId\n165545c9-2a5c-472c-8df2-7ff2be2b3b1b\n\
             Subject\ndeploy\n\
             Timestamp\n2024-01-01T00:00:00.000Z\n\
             TopicArn\narn:aws:sns:us-east-1:123456789012:status-topic\n\
             Type\nNotification\n"
        );
    }

    /// Subject is omitted from the canonical string when absent.
    #[test]
    fn test_notification_without_subject() {
        let mut envelope = sample_envelope();
        envelope.subject = None;
        let canonical =
            canonical_string(NotificationKind::Notification, &envelope).expect("canonical");

        assert!(!canonical.contains("Subject"));
        assert!(canonical.starts_with("Message\nbuild ok\nMessageId\n"));
    }

    /// Confirmation kinds include SubscribeURL and Token.
    #[test]
    fn test_confirmation_fields() {
        let envelope = confirmation_envelope();
        let canonical = canonical_string(NotificationKind::SubscriptionConfirmation, &envelope)
            .expect("canonical");

        assert_eq!(
            canonical,
            "Message\nYou have chosen to subscribe to the topic\n\
             MessageId\n165545c9-2a5c-472c-8df2-7ff2be2b3b1b\n\
             SubscribeURL\nhttps://sns.us-east-1.amazonaws.com/?Action=ConfirmSubscription\n\
             Timestamp\n2024-01-01T00:00:00.000Z\n\
             Token\n2336412f37\n\
             TopicArn\narn:aws:sns:us-east-1:123456789012:status-topic\n\
             Type\nSubscriptionConfirmation\n"
        );
    }

    /// A data message without a Message field is malformed.
    #[test]
    fn test_missing_message_rejected() {
        let mut envelope = sample_envelope();
        envelope.message = None;
        let result = canonical_string(NotificationKind::Notification, &envelope);
        assert!(matches!(
            result,
            Err(ValidationError::MalformedPayload { .. })
        ));
    }

    /// A confirmation without a Token is malformed.
    #[test]
    fn test_missing_token_rejected() {
        let mut envelope = confirmation_envelope();
        envelope.token = None;
        let result = canonical_string(NotificationKind::SubscriptionConfirmation, &envelope);
        assert!(matches!(
            result,
            Err(ValidationError::MalformedPayload { .. })
        ));
    }
}

// ============================================================================
// Signature verification tests
// ============================================================================

mod verify_signature_tests {
    use super::*;

    /// A SigV1 (SHA1) signature over the canonical string verifies.
    #[test]
    fn test_sigv1_roundtrip() {
        let (private_key, public_key) = test_key_pair();
        let envelope = sample_envelope();
        let canonical =
            canonical_string(NotificationKind::Notification, &envelope).expect("canonical");
        let signature = sign_v1(&private_key, &canonical);

        let result =
            verify_signature(SignatureVersion::V1, &canonical, &signature, &public_key);
        assert!(result.is_ok());
    }

    /// A SigV2 (SHA256) signature verifies under version 2.
    #[test]
    fn test_sigv2_roundtrip() {
        let (private_key, public_key) = test_key_pair();
        let envelope = sample_envelope();
        let canonical =
            canonical_string(NotificationKind::Notification, &envelope).expect("canonical");
        let signature = sign_v2(&private_key, &canonical);

        let result =
            verify_signature(SignatureVersion::V2, &canonical, &signature, &public_key);
        assert!(result.is_ok());
    }

    /// A SigV2 signature checked under version 1 must fail: the digest
    /// algorithm is part of the contract.
    #[test]
    fn test_version_mismatch_rejected() {
        let (private_key, public_key) = test_key_pair();
        let canonical = "Message\nbuild ok\n";
        let signature = sign_v2(&private_key, canonical);

        let result = verify_signature(SignatureVersion::V1, canonical, &signature, &public_key);
        assert!(matches!(result, Err(ValidationError::InvalidSignature)));
    }

    /// Tampering with the signed content invalidates the signature.
    #[test]
    fn test_tampered_content_rejected() {
        let (private_key, public_key) = test_key_pair();
        let canonical = "Message\nbuild ok\n";
        let signature = sign_v1(&private_key, canonical);

        let result = verify_signature(
            SignatureVersion::V1,
            "Message\nbuild FAILED\n",
            &signature,
            &public_key,
        );
        assert!(matches!(result, Err(ValidationError::InvalidSignature)));
    }

    /// A signature produced by a different key is rejected.
    #[test]
    fn test_wrong_key_rejected() {
        let (private_key, _) = test_key_pair();
        let (_, other_public_key) = test_key_pair();
        let canonical = "Message\nbuild ok\n";
        let signature = sign_v1(&private_key, canonical);

        let result =
            verify_signature(SignatureVersion::V1, canonical, &signature, &other_public_key);
        assert!(matches!(result, Err(ValidationError::InvalidSignature)));
    }

    /// Signature text that is not base64 is a malformed payload, not a
    /// signature mismatch.
    #[test]
    fn test_non_base64_signature_rejected() {
        let (_, public_key) = test_key_pair();
        let result = verify_signature(
            SignatureVersion::V1,
            "Message\nbuild ok\n",
            "!!! not base64 !!!",
            &public_key,
        );
        assert!(matches!(
            result,
            Err(ValidationError::MalformedPayload { .. })
        ));
    }
}

// ============================================================================
// SignatureVersion tests
// ============================================================================

mod signature_version_tests {
    use super::*;

    #[test]
    fn test_known_versions() {
        assert_eq!(SignatureVersion::parse("1").unwrap(), SignatureVersion::V1);
        assert_eq!(SignatureVersion::parse("2").unwrap(), SignatureVersion::V2);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let result = SignatureVersion::parse("3");
        assert!(matches!(
            result,
            Err(ValidationError::MalformedPayload { .. })
        ));
    }
}

// ============================================================================
// validate() entry point tests (paths that fail before any network call)
// ============================================================================

mod validate_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let validator = SnsPayloadValidator::new();
        let result = validator.validate(b"not json at all").await;
        assert!(matches!(
            result,
            Err(ValidationError::MalformedPayload { .. })
        ));
    }

    #[tokio::test]
    async fn test_unrecognized_kind_rejected() {
        let validator = SnsPayloadValidator::new();
        let body = serde_json::json!({
            "Type": "SomethingElse",
            "Message": "hello"
        });
        let result = validator.validate(body.to_string().as_bytes()).await;
        assert!(matches!(
            result,
            Err(ValidationError::MalformedPayload { .. })
        ));
    }

    /// The certificate URL is checked before anything is fetched, so a
    /// payload pointing at a foreign host fails without touching the network.
    #[tokio::test]
    async fn test_untrusted_cert_url_rejected_before_fetch() {
        let validator = SnsPayloadValidator::new();
        let body = serde_json::json!({
            "Type": "Notification",
            "MessageId": "id-1",
            "TopicArn": "arn:aws:sns:us-east-1:123456789012:topic",
            "Message": "build ok",
            "Timestamp": "2024-01-01T00:00:00.000Z",
            "SignatureVersion": "1",
            "Signature": "ZmFrZQ==",
            "SigningCertURL": "https://evil.example.com/cert.pem"
        });
        let result = validator.validate(body.to_string().as_bytes()).await;
        assert!(matches!(
            result,
            Err(ValidationError::UntrustedCertificate { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_signature_rejected() {
        let validator = SnsPayloadValidator::new();
        let body = serde_json::json!({
            "Type": "Notification",
            "MessageId": "id-1",
            "TopicArn": "arn:aws:sns:us-east-1:123456789012:topic",
            "Message": "build ok",
            "Timestamp": "2024-01-01T00:00:00.000Z",
            "SignatureVersion": "1",
            "SigningCertURL":
                "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-abc.pem"
        });
        let result = validator.validate(body.to_string().as_bytes()).await;
        assert!(matches!(
            result,
            Err(ValidationError::MalformedPayload { .. })
        ));
    }
}
