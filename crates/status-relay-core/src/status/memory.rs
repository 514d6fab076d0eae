//! Recording status publisher for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::status::{ChannelLabel, StatusPublishError, StatusPublisher};

/// [`StatusPublisher`] that records published statuses in memory.
#[derive(Debug, Default)]
pub struct MemoryStatusPublisher {
    published: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl MemoryStatusPublisher {
    /// Create a publisher that accepts every status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a publisher whose publishes all fail with a remote error.
    pub fn failing() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Recorded `(channel, status_text)` pairs, in publish order.
    pub fn published(&self) -> Vec<(String, String)> {
        self.published
            .lock()
            .expect("status record lock poisoned")
            .clone()
    }
}

#[async_trait]
impl StatusPublisher for MemoryStatusPublisher {
    async fn publish(
        &self,
        channel: &ChannelLabel,
        status_text: &str,
    ) -> Result<(), StatusPublishError> {
        if self.fail {
            return Err(StatusPublishError::RemoteUpdateFailed(
                github_commit_sdk::ApiError::HttpError {
                    status: 500,
                    message: "simulated remote failure".to_string(),
                },
            ));
        }
        self.published
            .lock()
            .expect("status record lock poisoned")
            .push((channel.as_str().to_string(), status_text.to_string()));
        Ok(())
    }
}
