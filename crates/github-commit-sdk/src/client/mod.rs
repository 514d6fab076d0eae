//! GitHub API client for Git Data operations.
//!
//! This module provides [`CommitClient`], a token-authenticated client scoped
//! to the handful of Git Data endpoints needed to build a commit remotely.
//! Construction is cheap; callers that fetch their token per operation can
//! create a fresh client for every commit sequence.

mod git_data;

use std::time::Duration;

use crate::error::ApiError;

pub use git_data::{
    BlobObject, CommitObject, GitRef, GitRefObject, NewCommit, TreeEntry, TreeObject, TreeRef,
};

/// Configuration for GitHub API client behavior.
///
/// Controls the user agent, request timeout, and API endpoint. The endpoint
/// override exists primarily so tests can point the client at a mock server.
///
/// # Examples
///
/// ```
/// use github_commit_sdk::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_api_url("https://github.example.com/api/v3");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for API requests (required by GitHub)
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// GitHub API base URL
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "github-commit-sdk/0.1.0".to_string(),
            timeout: Duration::from_secs(30),
            api_url: "https://api.github.com".to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for client configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the GitHub API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

/// Builder for constructing `ClientConfig` instances.
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new configuration builder with defaults.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the GitHub API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Token-authenticated client for the GitHub Git Data API.
///
/// Wraps a `reqwest::Client` and attaches the `Authorization` and `Accept`
/// headers GitHub expects on every request.
///
/// # Examples
///
/// ```no_run
/// # use github_commit_sdk::{ClientConfig, CommitClient};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CommitClient::new(ClientConfig::default(), "ghp_example")?;
/// let tip = client.get_ref("octocat", "Hello-World", "heads/main").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CommitClient {
    http_client: reqwest::Client,
    config: ClientConfig,
    token: String,
}

impl std::fmt::Debug for CommitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitClient")
            .field("config", &self.config)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl CommitClient {
    /// Create a new client with its own HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfiguration`] when the token is empty or
    /// the underlying HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, token: impl Into<String>) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::InvalidConfiguration {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Self::with_http_client(http_client, config, token)
    }

    /// Create a client that shares an existing HTTP connection pool.
    ///
    /// Useful when a fresh token is fetched per operation but the connection
    /// pool should be reused across operations.
    pub fn with_http_client(
        http_client: reqwest::Client,
        config: ClientConfig,
        token: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ApiError::InvalidConfiguration {
                message: "token must not be empty".to_string(),
            });
        }

        Ok(Self {
            http_client,
            config,
            token,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    pub(crate) async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http_client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await?;
        Ok(response)
    }

    pub(crate) async fn post<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http_client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    pub(crate) async fn patch<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http_client
            .patch(self.url(path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
