//! # GitHub Commit SDK
//!
//! A small, focused client for the GitHub Git Data API, covering exactly the
//! operations needed to compose a commit remotely: reading a branch ref,
//! reading a commit, creating blobs, building a tree, creating a commit, and
//! advancing the branch ref.
//!
//! The client is token-authenticated (personal access token or installation
//! token) and is constructed per operation so that the token is always the
//! one most recently retrieved from the secret store.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use github_commit_sdk::{ClientConfig, CommitClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CommitClient::new(ClientConfig::default(), "ghp_example")?;
//! let git_ref = client.get_ref("octocat", "Hello-World", "heads/main").await?;
//! println!("Branch tip: {}", git_ref.object.sha);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;

pub use client::{
    BlobObject, ClientConfig, ClientConfigBuilder, CommitClient, CommitObject, GitRef,
    GitRefObject, NewCommit, TreeEntry, TreeObject, TreeRef,
};
pub use error::ApiError;
