//! Recording alert publisher for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::alert::{AlertError, AlertPublisher};

/// [`AlertPublisher`] that records published messages in memory.
///
/// Construct with [`MemoryAlertPublisher::failing`] to simulate a broken
/// alert path.
#[derive(Debug, Default)]
pub struct MemoryAlertPublisher {
    published: Mutex<Vec<String>>,
    fail: bool,
}

impl MemoryAlertPublisher {
    /// Create a publisher that accepts every alert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a publisher that rejects every alert.
    pub fn failing() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages published so far, in order.
    pub fn published(&self) -> Vec<String> {
        self.published
            .lock()
            .expect("alert record lock poisoned")
            .clone()
    }
}

#[async_trait]
impl AlertPublisher for MemoryAlertPublisher {
    async fn alert(&self, message: &str) -> Result<(), AlertError> {
        if self.fail {
            return Err(AlertError::PublishFailed {
                message: "simulated publish failure".to_string(),
            });
        }
        self.published
            .lock()
            .expect("alert record lock poisoned")
            .push(message.to_string());
        Ok(())
    }
}
