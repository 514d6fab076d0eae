//! Git Data operations: refs, commits, blobs, and trees.
//!
//! These are the low-level building blocks GitHub exposes for composing a
//! commit without a local clone: read the branch tip, upload blobs, build a
//! tree on top of the previous one, create the commit, and advance the ref.

use serde::{Deserialize, Serialize};

use crate::client::CommitClient;
use crate::error::ApiError;

/// Git reference (branch or tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub url: String,
    pub object: GitRefObject,
}

/// Object a Git reference points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRefObject {
    pub sha: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub url: String,
}

/// Commit object with its tree pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitObject {
    pub sha: String,
    pub tree: TreeRef,
    #[serde(default)]
    pub message: Option<String>,
}

/// Tree pointer carried inside a commit object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRef {
    pub sha: String,
}

/// Blob created through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobObject {
    pub sha: String,
    pub url: String,
}

/// One entry in a tree to be created.
///
/// `mode` is the Git file mode; regular files use `100644`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub sha: String,
}

impl TreeEntry {
    /// Create a regular-file blob entry at `path`.
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: "100644".to_string(),
            entry_type: "blob".to_string(),
            sha: sha.into(),
        }
    }
}

/// Tree created through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeObject {
    pub sha: String,
    pub url: String,
}

/// Request body for creating a commit.
#[derive(Debug, Clone, Serialize)]
pub struct NewCommit {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

/// Request body for creating a blob.
#[derive(Debug, Serialize)]
struct NewBlob<'a> {
    content: &'a str,
    encoding: &'a str,
}

/// Request body for creating a tree.
#[derive(Debug, Serialize)]
struct NewTree<'a> {
    base_tree: &'a str,
    tree: &'a [TreeEntry],
}

/// Request body for updating a Git reference.
#[derive(Debug, Serialize)]
struct UpdateGitRefRequest<'a> {
    sha: &'a str,
    force: bool,
}

impl CommitClient {
    /// Get a Git reference (branch or tag).
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `ref_name` - Reference name (e.g., "heads/main")
    ///
    /// # Errors
    ///
    /// * `ApiError::NotFound` - Reference does not exist
    /// * `ApiError::AuthenticationFailed` / `ApiError::AuthorizationFailed` -
    ///   token rejected or lacking permission
    pub async fn get_ref(
        &self,
        owner: &str,
        repo: &str,
        ref_name: &str,
    ) -> Result<GitRef, ApiError> {
        let path = format!("/repos/{}/{}/git/ref/{}", owner, repo, ref_name);
        let response = self.get(&path).await?;
        deserialize_response(response).await
    }

    /// Get a commit object by SHA, including its tree pointer.
    pub async fn get_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<CommitObject, ApiError> {
        let path = format!("/repos/{}/{}/git/commits/{}", owner, repo, sha);
        let response = self.get(&path).await?;
        deserialize_response(response).await
    }

    /// Create a blob from UTF-8 text content.
    pub async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content: &str,
    ) -> Result<BlobObject, ApiError> {
        let path = format!("/repos/{}/{}/git/blobs", owner, repo);
        let body = NewBlob {
            content,
            encoding: "utf-8",
        };
        let response = self.post(&path, &body).await?;
        deserialize_response(response).await
    }

    /// Create a tree on top of `base_tree` referencing the given entries.
    pub async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<TreeObject, ApiError> {
        let path = format!("/repos/{}/{}/git/trees", owner, repo);
        let body = NewTree {
            base_tree,
            tree: entries,
        };
        let response = self.post(&path, &body).await?;
        deserialize_response(response).await
    }

    /// Create a commit object.
    pub async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: &NewCommit,
    ) -> Result<CommitObject, ApiError> {
        let path = format!("/repos/{}/{}/git/commits", owner, repo);
        let response = self.post(&path, commit).await?;
        deserialize_response(response).await
    }

    /// Advance a Git reference to `sha` (non-force; the update must be a
    /// fast-forward).
    pub async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        ref_name: &str,
        sha: &str,
    ) -> Result<GitRef, ApiError> {
        let path = format!("/repos/{}/{}/git/refs/{}", owner, repo, ref_name);
        let body = UpdateGitRefRequest { sha, force: false };
        let response = self.patch(&path, &body).await?;
        deserialize_response(response).await
    }
}

/// Map HTTP status codes to [`ApiError`] and deserialize successful bodies.
async fn deserialize_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(match status.as_u16() {
            404 => ApiError::NotFound,
            403 => ApiError::AuthorizationFailed,
            401 => ApiError::AuthenticationFailed,
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                ApiError::HttpError {
                    status: status.as_u16(),
                    message,
                }
            }
        });
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::SerializationError {
            message: e.to_string(),
        })
}

#[cfg(test)]
#[path = "git_data_tests.rs"]
mod tests;
