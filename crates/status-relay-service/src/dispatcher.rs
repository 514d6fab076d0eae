//! Per-request dispatch: validate, then confirm or forward.
//!
//! Each route owns a [`RelayChannel`] naming its status channel and error
//! artifact. The dispatch flow is the same for both routes:
//!
//! 1. Validate the raw body through the injected [`PayloadValidator`].
//! 2. Confirmation kinds: fetch the confirmation URL and wait for the
//!    outcome. Only a transport failure here is surfaced to the HTTP caller.
//! 3. Data messages: build `"<timestamp> - <message>"` and hand it to the
//!    [`StatusPublisher`].
//! 4. Any other failure is recorded to the channel's error artifact and
//!    reported through the [`AlertPublisher`]; the caller still sees success.
//!    A failure inside this recording path is not caught and fails the
//!    request outright.
//!
//! No step is retried; every external call runs exactly once per request.

use chrono::{SecondsFormat, Utc};
use status_relay_core::alert::AlertError;
use status_relay_core::notification::ValidationError;
use status_relay_core::status::{ChannelLabel, StatusPublishError};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::AppState;

/// Alert text published when request handling fails. Fixed by contract with
/// the operators' alert filters.
pub const VALIDATION_FAILURE_ALERT: &str = "sns-payload-validator failed";

// ============================================================================
// Relay Channels
// ============================================================================

/// Identity of one webhook route: its status channel plus the local file
/// that records the route's most recent failure.
#[derive(Debug, Clone)]
pub struct RelayChannel {
    label: ChannelLabel,
    error_artifact: &'static str,
}

impl RelayChannel {
    /// Channel served by `POST /`.
    pub fn primary() -> Self {
        Self {
            label: ChannelLabel::new("status").expect("status is a valid channel label"),
            error_artifact: "error.txt",
        }
    }

    /// Channel served by `POST /sigV2`.
    pub fn sig_v2() -> Self {
        Self {
            label: ChannelLabel::new("status-sigV2").expect("status-sigV2 is a valid channel label"),
            error_artifact: "error-sigV2.txt",
        }
    }

    /// The channel's status label (and status file name).
    pub fn label(&self) -> &ChannelLabel {
        &self.label
    }

    /// File name recording the channel's most recent failure.
    pub fn error_artifact(&self) -> &'static str {
        self.error_artifact
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Outcome of a dispatched request, carrying everything the HTTP layer needs
/// to produce a response.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Data message forwarded to the status publisher (200).
    MessageForwarded,
    /// Confirmation URL fetched successfully (200).
    SubscriptionConfirmed,
    /// Confirmation URL fetch failed at the transport level (400).
    ConfirmationFailed { message: String },
    /// A failure was recorded and alerted; the caller still sees success (200).
    FailureRecorded,
}

/// Failure of the error-recording path itself. Deliberately not caught
/// anywhere; the request fails while the server keeps serving.
#[derive(Debug, Error)]
pub enum ErrorPathFailure {
    #[error("Failed to write error artifact {path}: {message}")]
    ArtifactWriteFailed { path: String, message: String },

    #[error("Failed to publish failure alert: {0}")]
    AlertFailed(#[from] AlertError),
}

/// Errors that route a request into the error-recording path, plus the one
/// error surfaced directly to the caller.
#[derive(Debug, Error)]
enum RelayError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Error confirming subscription: {message}")]
    ConfirmationFetchFailed { message: String },

    #[error("{0}")]
    Publish(#[from] StatusPublishError),
}

/// Handle one request body for a channel.
///
/// # Errors
///
/// Returns [`ErrorPathFailure`] only when the error-recording path itself
/// fails; every other failure is absorbed into the returned outcome.
#[instrument(skip(state, body), fields(channel = %channel.label(), body_len = body.len()))]
pub async fn dispatch(
    state: &AppState,
    channel: &RelayChannel,
    body: &[u8],
) -> Result<DispatchOutcome, ErrorPathFailure> {
    match relay(state, channel, body).await {
        Ok(outcome) => Ok(outcome),
        Err(RelayError::ConfirmationFetchFailed { message }) => {
            warn!(channel = %channel.label(), error = %message, "Confirmation fetch failed");
            Ok(DispatchOutcome::ConfirmationFailed { message })
        }
        Err(relay_error) => {
            warn!(
                channel = %channel.label(),
                error = %relay_error,
                "Request failed; recording error artifact and alerting"
            );
            record_failure(state, channel, &relay_error).await?;
            Ok(DispatchOutcome::FailureRecorded)
        }
    }
}

async fn relay(
    state: &AppState,
    channel: &RelayChannel,
    body: &[u8],
) -> Result<DispatchOutcome, RelayError> {
    let notification = state.validator.validate(body).await?;

    if notification.kind.is_confirmation() {
        // The validator guarantees SubscribeURL presence for confirmation
        // kinds; a miss here means the validator contract was broken.
        let confirmation_url =
            notification
                .subscribe_url
                .ok_or_else(|| ValidationError::MalformedPayload {
                    message: "confirmation payload has no SubscribeURL".to_string(),
                })?;

        state
            .http_client
            .get(&confirmation_url)
            .send()
            .await
            .map_err(|e| RelayError::ConfirmationFetchFailed {
                message: e.to_string(),
            })?;

        info!(kind = %notification.kind, "Subscription handshake confirmed");
        return Ok(DispatchOutcome::SubscriptionConfirmed);
    }

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let status_text = format!("{} - {}", timestamp, notification.message);
    state
        .status_publisher
        .publish(channel.label(), &status_text)
        .await?;

    info!(channel = %channel.label(), "Message forwarded to status publisher");
    Ok(DispatchOutcome::MessageForwarded)
}

/// Overwrite the channel's error artifact and publish the fixed alert.
async fn record_failure(
    state: &AppState,
    channel: &RelayChannel,
    relay_error: &RelayError,
) -> Result<(), ErrorPathFailure> {
    let artifact_path = state.working_dir.join(channel.error_artifact());
    tokio::fs::write(&artifact_path, relay_error.to_string())
        .await
        .map_err(|e| {
            error!(path = %artifact_path.display(), error = %e, "Error artifact write failed");
            ErrorPathFailure::ArtifactWriteFailed {
                path: artifact_path.display().to_string(),
                message: e.to_string(),
            }
        })?;

    state.alert_publisher.alert(VALIDATION_FAILURE_ALERT).await?;
    Ok(())
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
