//! Tests for Git Data operations against a mock GitHub API.

use super::*;
use crate::client::ClientConfig;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

async fn test_client(server: &MockServer) -> CommitClient {
    let config = ClientConfig::default().with_api_url(server.uri());
    CommitClient::new(config, "ghp_test_token").expect("client construction")
}

// ============================================================================
// get_ref tests
// ============================================================================

mod get_ref_tests {
    use super::*;

    /// get_ref resolves the branch tip SHA from the ref response.
    #[tokio::test]
    async fn test_get_ref_returns_tip_sha() {
        let mock_server = MockServer::start().await;

        let ref_json = serde_json::json!({
            "ref": "refs/heads/main",
            "url": "https://api.github.com/repos/octocat/Hello-World/git/refs/heads/main",
            "object": {
                "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd",
                "type": "commit",
                "url": "https://api.github.com/repos/octocat/Hello-World/git/commits/aa218f56b14c9653891f9e74264a383fa43fefbd"
            }
        });

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/git/ref/heads/main"))
            .and(header("authorization", "Bearer ghp_test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ref_json))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server).await;
        let git_ref = client
            .get_ref("octocat", "Hello-World", "heads/main")
            .await
            .expect("get_ref");

        assert_eq!(git_ref.ref_name, "refs/heads/main");
        assert_eq!(git_ref.object.sha, "aa218f56b14c9653891f9e74264a383fa43fefbd");
        assert_eq!(git_ref.object.object_type, "commit");
    }

    /// A 404 from GitHub maps to ApiError::NotFound.
    #[tokio::test]
    async fn test_get_ref_missing_maps_to_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/git/ref/heads/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server).await;
        let result = client.get_ref("octocat", "Hello-World", "heads/missing").await;

        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    /// A 401 maps to AuthenticationFailed.
    #[tokio::test]
    async fn test_get_ref_rejected_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server).await;
        let result = client.get_ref("octocat", "Hello-World", "heads/main").await;

        assert!(matches!(result, Err(ApiError::AuthenticationFailed)));
    }
}

// ============================================================================
// get_commit tests
// ============================================================================

mod get_commit_tests {
    use super::*;

    /// get_commit exposes the commit's tree SHA.
    #[tokio::test]
    async fn test_get_commit_returns_tree_sha() {
        let mock_server = MockServer::start().await;

        let commit_json = serde_json::json!({
            "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd",
            "message": "initial commit",
            "tree": {
                "sha": "691272480426f78a0138979dd3ce63b77f706feb"
            }
        });

        Mock::given(method("GET"))
            .and(path(
                "/repos/octocat/Hello-World/git/commits/aa218f56b14c9653891f9e74264a383fa43fefbd",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(commit_json))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server).await;
        let commit = client
            .get_commit(
                "octocat",
                "Hello-World",
                "aa218f56b14c9653891f9e74264a383fa43fefbd",
            )
            .await
            .expect("get_commit");

        assert_eq!(commit.tree.sha, "691272480426f78a0138979dd3ce63b77f706feb");
        assert_eq!(commit.message.as_deref(), Some("initial commit"));
    }
}

// ============================================================================
// create_blob tests
// ============================================================================

mod create_blob_tests {
    use super::*;

    /// create_blob posts UTF-8 content and returns the blob SHA.
    #[tokio::test]
    async fn test_create_blob_posts_utf8_content() {
        let mock_server = MockServer::start().await;

        let blob_json = serde_json::json!({
            "sha": "3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15",
            "url": "https://api.github.com/repos/octocat/Hello-World/git/blobs/3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15"
        });

        Mock::given(method("POST"))
            .and(path("/repos/octocat/Hello-World/git/blobs"))
            .and(body_partial_json(serde_json::json!({
                "content": "2024-01-01T00:00:00.000Z - build ok",
                "encoding": "utf-8"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(blob_json))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server).await;
        let blob = client
            .create_blob("octocat", "Hello-World", "2024-01-01T00:00:00.000Z - build ok")
            .await
            .expect("create_blob");

        assert_eq!(blob.sha, "3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15");
    }
}

// ============================================================================
// create_tree / create_commit / update_ref tests
// ============================================================================

mod commit_pipeline_tests {
    use super::*;

    /// create_tree sends the base tree and every entry at mode 100644.
    #[tokio::test]
    async fn test_create_tree_references_base_tree() {
        let mock_server = MockServer::start().await;

        let tree_json = serde_json::json!({
            "sha": "cd8274d15fa3ae2ab983129fb037999f264ba9a7",
            "url": "https://api.github.com/repos/octocat/Hello-World/git/trees/cd8274d15fa3ae2ab983129fb037999f264ba9a7"
        });

        Mock::given(method("POST"))
            .and(path("/repos/octocat/Hello-World/git/trees"))
            .and(body_partial_json(serde_json::json!({
                "base_tree": "691272480426f78a0138979dd3ce63b77f706feb",
                "tree": [{
                    "path": "status",
                    "mode": "100644",
                    "type": "blob",
                    "sha": "3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15"
                }]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(tree_json))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server).await;
        let entries = vec![TreeEntry::blob(
            "status",
            "3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15",
        )];
        let tree = client
            .create_tree(
                "octocat",
                "Hello-World",
                "691272480426f78a0138979dd3ce63b77f706feb",
                &entries,
            )
            .await
            .expect("create_tree");

        assert_eq!(tree.sha, "cd8274d15fa3ae2ab983129fb037999f264ba9a7");
    }

    /// create_commit sends message, tree, and the parent commit.
    #[tokio::test]
    async fn test_create_commit_links_parent() {
        let mock_server = MockServer::start().await;

        let commit_json = serde_json::json!({
            "sha": "7638417db6d59f3c431d3e1f261cc637155684cd",
            "message": "2024-01-01T00:00:00.000Z - Update status file",
            "tree": {
                "sha": "cd8274d15fa3ae2ab983129fb037999f264ba9a7"
            }
        });

        Mock::given(method("POST"))
            .and(path("/repos/octocat/Hello-World/git/commits"))
            .and(body_partial_json(serde_json::json!({
                "message": "2024-01-01T00:00:00.000Z - Update status file",
                "tree": "cd8274d15fa3ae2ab983129fb037999f264ba9a7",
                "parents": ["aa218f56b14c9653891f9e74264a383fa43fefbd"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(commit_json))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server).await;
        let new_commit = NewCommit {
            message: "2024-01-01T00:00:00.000Z - Update status file".to_string(),
            tree: "cd8274d15fa3ae2ab983129fb037999f264ba9a7".to_string(),
            parents: vec!["aa218f56b14c9653891f9e74264a383fa43fefbd".to_string()],
        };
        let commit = client
            .create_commit("octocat", "Hello-World", &new_commit)
            .await
            .expect("create_commit");

        assert_eq!(commit.sha, "7638417db6d59f3c431d3e1f261cc637155684cd");
    }

    /// update_ref patches the ref with the new SHA, non-force.
    #[tokio::test]
    async fn test_update_ref_is_non_force() {
        let mock_server = MockServer::start().await;

        let ref_json = serde_json::json!({
            "ref": "refs/heads/main",
            "url": "https://api.github.com/repos/octocat/Hello-World/git/refs/heads/main",
            "object": {
                "sha": "7638417db6d59f3c431d3e1f261cc637155684cd",
                "type": "commit",
                "url": "https://api.github.com/repos/octocat/Hello-World/git/commits/7638417db6d59f3c431d3e1f261cc637155684cd"
            }
        });

        Mock::given(method("PATCH"))
            .and(path("/repos/octocat/Hello-World/git/refs/heads/main"))
            .and(body_partial_json(serde_json::json!({
                "sha": "7638417db6d59f3c431d3e1f261cc637155684cd",
                "force": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ref_json))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server).await;
        let git_ref = client
            .update_ref(
                "octocat",
                "Hello-World",
                "heads/main",
                "7638417db6d59f3c431d3e1f261cc637155684cd",
            )
            .await
            .expect("update_ref");

        assert_eq!(git_ref.object.sha, "7638417db6d59f3c431d3e1f261cc637155684cd");
    }

    /// A fast-forward conflict (422) surfaces as HttpError, not a panic.
    #[tokio::test]
    async fn test_update_ref_conflict_maps_to_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/repos/octocat/Hello-World/git/refs/heads/main"))
            .respond_with(
                ResponseTemplate::new(422).set_body_string("Update is not a fast forward"),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server).await;
        let result = client
            .update_ref("octocat", "Hello-World", "heads/main", "deadbeef")
            .await;

        match result {
            Err(ApiError::HttpError { status, message }) => {
                assert_eq!(status, 422);
                assert!(message.contains("fast forward"));
            }
            other => panic!("expected HttpError, got {:?}", other.map(|r| r.object.sha)),
        }
    }
}
