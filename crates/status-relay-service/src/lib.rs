//! # Status Relay HTTP Service
//!
//! HTTP server for receiving SNS notification deliveries and relaying them
//! into the status side channel.
//!
//! This service provides:
//! - Two structurally identical webhook endpoints (`POST /`, `POST /sigV2`)
//!   differing only in status channel and error artifact
//! - Automatic confirmation of subscribe/unsubscribe handshakes
//! - A liveness endpoint (`GET /health`)
//!
//! Validation, status publication, and alerting are injected as trait
//! objects through [`AppState`]; the binary wires production
//! implementations, tests wire in-memory doubles.

pub mod config;
pub mod dispatcher;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use status_relay_core::alert::AlertPublisher;
use status_relay_core::notification::PayloadValidator;
use status_relay_core::status::StatusPublisher;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::dispatcher::{dispatch, DispatchOutcome, RelayChannel};


// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Payload validator gating every request
    pub validator: Arc<dyn PayloadValidator>,

    /// Status publisher for data messages
    pub status_publisher: Arc<dyn StatusPublisher>,

    /// Alert publisher for the error path
    pub alert_publisher: Arc<dyn AlertPublisher>,

    /// HTTP client used for confirmation-URL fetches
    pub http_client: reqwest::Client,

    /// Directory holding error artifacts
    pub working_dir: PathBuf,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        validator: Arc<dyn PayloadValidator>,
        status_publisher: Arc<dyn StatusPublisher>,
        alert_publisher: Arc<dyn AlertPublisher>,
        http_client: reqwest::Client,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            validator,
            status_publisher,
            alert_publisher,
            http_client,
            working_dir: working_dir.into(),
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create the HTTP router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handle_primary))
        .route("/sigV2", post(handle_sig_v2))
        .route("/health", get(handle_health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server with graceful shutdown on SIGINT/SIGTERM.
pub async fn start_server(config: ServiceConfig, state: AppState) -> Result<(), ServiceError> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ServiceError::Configuration {
            message: format!("invalid listen address: {}", e),
        })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: addr.to_string(),
            message: e.to_string(),
        })?;

    info!("Starting HTTP server on {}", addr);

    let shutdown_timeout =
        std::time::Duration::from_secs(config.server.shutdown_timeout_seconds);

    let shutdown_signal = async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Errors that prevent the service from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to bind {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /` — primary status channel.
async fn handle_primary(State(state): State<AppState>, body: Bytes) -> Response {
    relay_response(&state, &RelayChannel::primary(), &body).await
}

/// `POST /sigV2` — secondary status channel.
async fn handle_sig_v2(State(state): State<AppState>, body: Bytes) -> Response {
    relay_response(&state, &RelayChannel::sig_v2(), &body).await
}

/// `GET /health` — liveness only.
async fn handle_health_check() -> StatusCode {
    StatusCode::OK
}

/// Map a dispatch outcome onto the HTTP contract: 200 with an empty body for
/// everything except a confirmation-fetch failure (400 with a short text
/// body) and a failed error-recording path (500).
async fn relay_response(state: &AppState, channel: &RelayChannel, body: &[u8]) -> Response {
    match dispatch(state, channel, body).await {
        Ok(DispatchOutcome::MessageForwarded)
        | Ok(DispatchOutcome::SubscriptionConfirmed)
        | Ok(DispatchOutcome::FailureRecorded) => StatusCode::OK.into_response(),
        Ok(DispatchOutcome::ConfirmationFailed { .. }) => {
            (StatusCode::BAD_REQUEST, "Error confirming subscription").into_response()
        }
        Err(error_path_failure) => {
            error!(
                channel = %channel.label(),
                error = %error_path_failure,
                "Error-recording path failed; request fails unhandled"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
