//! Service configuration.
//!
//! Every field carries a serde default, so an entirely unconfigured
//! environment produces a working service pointed at the production
//! repository. Overrides come from an optional `config/service.yaml`, an
//! operator-specified file (`SR_CONFIG_FILE`), and `SR__`-prefixed
//! environment variables, in that order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Target repository for status commits
    pub github: GithubConfig,

    /// AWS client settings
    pub aws: AwsConfig,

    /// Status artifact settings
    pub status: StatusConfig,
}

impl ServiceConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port",
                message: "port must be non-zero".to_string(),
            });
        }
        if self.github.owner.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "github.owner",
                message: "owner must not be empty".to_string(),
            });
        }
        if self.github.repo.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "github.repo",
                message: "repo must not be empty".to_string(),
            });
        }
        if !self.github.branch.starts_with("heads/") {
            return Err(ConfigError::InvalidValue {
                field: "github.branch",
                message: "branch must be a heads/ reference".to_string(),
            });
        }
        if self.status.working_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "status.working_dir",
                message: "working_dir must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout_seconds: 30,
        }
    }
}

/// Target repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Branch reference to advance, e.g. "heads/main"
    pub branch: String,

    /// GitHub API base URL
    pub api_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: "devinstewart".to_string(),
            repo: "sns-tester".to_string(),
            branch: "heads/main".to_string(),
            api_url: "https://api.github.com".to_string(),
        }
    }
}

/// AWS client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Region for the SSM and SNS clients
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
        }
    }
}

/// Status artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Directory holding status files and error artifacts; its content is
    /// replayed into every status commit
    pub working_dir: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            working_dir: ".".to_string(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

// ============================================================================
// Loading
// ============================================================================

/// Load the service configuration.
///
/// Sources (applied in order, later sources override earlier ones):
///  1. ./config/service.yaml            — deployment-local override
///  2. Path given by SR_CONFIG_FILE env — operator-specified file
///  3. Environment variables prefixed SR__ (double-underscore separator)
///     e.g. SR__SERVER__PORT=9090 sets server.port = 9090
pub fn load_config() -> Result<ServiceConfig, config::ConfigError> {
    let mut builder = config::Config::builder().add_source(
        config::File::with_name("config/service")
            .required(false)
            .format(config::FileFormat::Yaml),
    );

    if let Ok(explicit_path) = std::env::var("SR_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            builder = builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }
    }

    builder
        .add_source(config::Environment::with_prefix("SR").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
