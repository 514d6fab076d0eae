//! Status publication: local file overwrite plus a remote commit.
//!
//! Each logical channel owns a single status file. Publishing overwrites the
//! local file and then replays the working tree into the remote repository as
//! a fresh commit: resolve the branch tip, upload one blob per tracked file,
//! build a tree on top of the previous one, commit, and advance the ref.
//!
//! The local write always happens first and is never rolled back; a remote
//! failure leaves the local file updated and the remote repository untouched.

mod memory;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use futures::future::try_join_all;
use github_commit_sdk::{ApiError, ClientConfig, CommitClient, NewCommit, TreeEntry};
use thiserror::Error;
use tracing::{info, instrument};

use crate::secrets::{ParameterStore, ParameterStoreError, WellKnownParameters};

pub use memory::MemoryStatusPublisher;

// ============================================================================
// Channel Label
// ============================================================================

/// Name of a status channel, doubling as the status file name.
///
/// Labels are restricted to ASCII alphanumerics and dashes so they are always
/// safe as file names and as Git tree paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelLabel(String);

impl ChannelLabel {
    /// Create a new channel label with validation.
    pub fn new(label: impl Into<String>) -> Result<Self, StatusPublishError> {
        let label = label.into();

        if label.is_empty() {
            return Err(StatusPublishError::InvalidChannelLabel {
                label,
                reason: "label cannot be empty".to_string(),
            });
        }

        if label.len() > 64 {
            return Err(StatusPublishError::InvalidChannelLabel {
                label,
                reason: "label exceeds 64 character limit".to_string(),
            });
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(StatusPublishError::InvalidChannelLabel {
                label,
                reason: "label contains invalid characters".to_string(),
            });
        }

        Ok(Self(label))
    }

    /// Get string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Interface
// ============================================================================

/// Durable publication of a status string for a channel.
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Persist `status_text` for `channel` locally and remotely.
    ///
    /// # Errors
    ///
    /// * [`StatusPublishError::Io`] - the local status file could not be written
    /// * [`StatusPublishError::TokenLookupFailed`] - the GitHub token could
    ///   not be resolved
    /// * [`StatusPublishError::RemoteUpdateFailed`] - any step of the remote
    ///   commit sequence failed
    async fn publish(
        &self,
        channel: &ChannelLabel,
        status_text: &str,
    ) -> Result<(), StatusPublishError>;
}

/// Errors that can occur while publishing a status update.
#[derive(Debug, Error)]
pub enum StatusPublishError {
    #[error("Invalid channel label {label}: {reason}")]
    InvalidChannelLabel { label: String, reason: String },

    #[error("Status file I/O failed for {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to resolve GitHub token: {0}")]
    TokenLookupFailed(#[from] ParameterStoreError),

    #[error("Remote status update failed: {0}")]
    RemoteUpdateFailed(#[from] ApiError),
}

// ============================================================================
// GitHub implementation
// ============================================================================

/// Remote repository a channel's status file is committed to.
#[derive(Debug, Clone)]
pub struct StatusRepository {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch reference to advance, e.g. `heads/main`.
    pub branch: String,
}

/// [`StatusPublisher`] that commits the working tree to a GitHub repository.
///
/// The GitHub token is fetched from the parameter store on every publish so
/// rotation takes effect immediately. The HTTP connection pool is shared
/// across publishes; only the token-bearing client is rebuilt.
pub struct GithubStatusPublisher {
    parameter_store: Arc<dyn ParameterStore>,
    client_config: ClientConfig,
    http_client: reqwest::Client,
    repository: StatusRepository,
    working_dir: PathBuf,
}

impl GithubStatusPublisher {
    /// Create a publisher.
    ///
    /// # Arguments
    ///
    /// * `parameter_store` - source of the GitHub token
    /// * `client_config` - GitHub API client configuration
    /// * `repository` - target owner/repo/branch
    /// * `working_dir` - directory holding status files; its full content is
    ///   replayed into every commit
    ///
    /// # Errors
    ///
    /// Returns [`StatusPublishError::RemoteUpdateFailed`] when the HTTP
    /// client cannot be constructed from the configuration.
    pub fn new(
        parameter_store: Arc<dyn ParameterStore>,
        client_config: ClientConfig,
        repository: StatusRepository,
        working_dir: impl Into<PathBuf>,
    ) -> Result<Self, StatusPublishError> {
        let http_client = reqwest::Client::builder()
            .timeout(client_config.timeout)
            .build()
            .map_err(|e| {
                StatusPublishError::RemoteUpdateFailed(ApiError::InvalidConfiguration {
                    message: format!("failed to build HTTP client: {}", e),
                })
            })?;

        Ok(Self {
            parameter_store,
            client_config,
            http_client,
            repository,
            working_dir: working_dir.into(),
        })
    }
}

impl std::fmt::Debug for GithubStatusPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubStatusPublisher")
            .field("repository", &self.repository)
            .field("working_dir", &self.working_dir)
            .finish()
    }
}

#[async_trait]
impl StatusPublisher for GithubStatusPublisher {
    #[instrument(skip(self, status_text), fields(channel = %channel))]
    async fn publish(
        &self,
        channel: &ChannelLabel,
        status_text: &str,
    ) -> Result<(), StatusPublishError> {
        // Local overwrite first; never rolled back on remote failure.
        let status_path = self.working_dir.join(channel.as_str());
        tokio::fs::write(&status_path, status_text)
            .await
            .map_err(|e| StatusPublishError::Io {
                path: status_path.display().to_string(),
                message: e.to_string(),
            })?;

        let token = self
            .parameter_store
            .get_parameter(WellKnownParameters::GITHUB_TOKEN)
            .await?;
        let client = CommitClient::with_http_client(
            self.http_client.clone(),
            self.client_config.clone(),
            token,
        )?;

        let owner = self.repository.owner.as_str();
        let repo = self.repository.repo.as_str();
        let branch = self.repository.branch.as_str();

        let git_ref = client.get_ref(owner, repo, branch).await?;
        let tip_sha = git_ref.object.sha;
        let tip_commit = client.get_commit(owner, repo, &tip_sha).await?;

        let files = enumerate_working_tree(&self.working_dir)?;

        // Blobs have no ordering dependency on one another; upload them
        // concurrently and keep the tree entries in enumeration order.
        let blob_futures = files.iter().map(|file| {
            let client = &client;
            async move {
                let content = tokio::fs::read_to_string(&file.absolute).await.map_err(|e| {
                    StatusPublishError::Io {
                        path: file.absolute.display().to_string(),
                        message: e.to_string(),
                    }
                })?;
                let blob = client.create_blob(owner, repo, &content).await?;
                Ok::<TreeEntry, StatusPublishError>(TreeEntry::blob(file.relative.clone(), blob.sha))
            }
        });
        let entries = try_join_all(blob_futures).await?;

        let tree = client
            .create_tree(owner, repo, &tip_commit.tree.sha, &entries)
            .await?;

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let new_commit = client
            .create_commit(
                owner,
                repo,
                &NewCommit {
                    message: format!("{} - Update status file", timestamp),
                    tree: tree.sha,
                    parents: vec![tip_sha.clone()],
                },
            )
            .await?;

        client
            .update_ref(owner, repo, branch, &new_commit.sha)
            .await?;

        info!(
            channel = %channel,
            commit = %new_commit.sha,
            parent = %tip_sha,
            "Status committed to remote repository"
        );
        Ok(())
    }
}

// ============================================================================
// Working tree enumeration
// ============================================================================

struct WorkingTreeFile {
    absolute: PathBuf,
    relative: String,
}

/// Enumerate files under `root`, honoring gitignore rules and skipping
/// hidden files, sorted by relative path for deterministic trees.
fn enumerate_working_tree(root: &Path) -> Result<Vec<WorkingTreeFile>, StatusPublishError> {
    let mut files = Vec::new();

    for entry in ignore::WalkBuilder::new(root).build() {
        let entry = entry.map_err(|e| StatusPublishError::Io {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
            continue;
        }

        let absolute = entry.into_path();
        let relative = absolute
            .strip_prefix(root)
            .unwrap_or(&absolute)
            .to_string_lossy()
            .into_owned();
        files.push(WorkingTreeFile { absolute, relative });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
