//! # Status Relay Service
//!
//! Binary entry point for the Status Relay HTTP service.
//!
//! This executable:
//! - Loads configuration from an optional file and environment variables
//! - Initializes logging
//! - Wires the payload validator, parameter store, status publisher, and
//!   alert publisher
//! - Starts the HTTP server with graceful shutdown

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use github_commit_sdk::ClientConfig;
use status_relay_core::alert::SnsAlertPublisher;
use status_relay_core::notification::SnsPayloadValidator;
use status_relay_core::secrets::SsmParameterStore;
use status_relay_core::status::{GithubStatusPublisher, StatusRepository};
use status_relay_service::config::load_config;
use status_relay_service::{start_server, AppState, ServiceError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "status_relay_service=info,status_relay_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Status Relay Service");

    // -------------------------------------------------------------------------
    // Load configuration
    //
    // All fields carry serde defaults, so an unconfigured environment produces
    // a valid service config. A malformed file or an environment variable that
    // cannot be coerced IS a hard error because it indicates
    // deliberate-but-broken operator configuration.
    // -------------------------------------------------------------------------
    let service_config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to build configuration; aborting");
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    // -------------------------------------------------------------------------
    // Wire dependencies
    //
    // The SSM parameter store is the single source for runtime secrets: the
    // alert publisher resolves its topic ARN through it and the status
    // publisher resolves the GitHub token through it, both per call.
    // -------------------------------------------------------------------------
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(service_config.aws.region.clone()))
        .load()
        .await;

    let parameter_store = Arc::new(SsmParameterStore::new(aws_sdk_ssm::Client::new(&aws_config)));
    let alert_publisher = Arc::new(SnsAlertPublisher::new(
        aws_sdk_sns::Client::new(&aws_config),
        parameter_store.clone(),
    ));
    let validator = Arc::new(SnsPayloadValidator::new());

    let client_config = ClientConfig::default().with_api_url(&service_config.github.api_url);
    let status_publisher = match GithubStatusPublisher::new(
        parameter_store.clone(),
        client_config,
        StatusRepository {
            owner: service_config.github.owner.clone(),
            repo: service_config.github.repo.clone(),
            branch: service_config.github.branch.clone(),
        },
        &service_config.status.working_dir,
    ) {
        Ok(publisher) => Arc::new(publisher),
        Err(e) => {
            error!(error = %e, "Failed to construct status publisher; aborting");
            std::process::exit(3);
        }
    };

    let state = AppState::new(
        validator,
        status_publisher,
        alert_publisher,
        reqwest::Client::new(),
        service_config.status.working_dir.clone(),
    );

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        repository = %format!("{}/{}", service_config.github.owner, service_config.github.repo),
        "Starting HTTP server"
    );

    // Start the server
    if let Err(e) = start_server(service_config, state).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration { .. } => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}
