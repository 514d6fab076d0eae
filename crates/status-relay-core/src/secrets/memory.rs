//! In-memory parameter store for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::secrets::{ParameterStore, ParameterStoreError};

/// Thread-safe in-memory [`ParameterStore`].
///
/// Lookups against names that were never inserted return
/// [`ParameterStoreError::ParameterNotFound`], which makes the empty store a
/// convenient failure double in dispatcher tests.
#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    parameters: RwLock<HashMap<String, String>>,
}

impl MemoryParameterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with parameters.
    pub fn with_parameters<I, K, V>(parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            parameters: RwLock::new(map),
        }
    }

    /// Insert or replace a parameter.
    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters
            .write()
            .expect("parameter store lock poisoned")
            .insert(name.into(), value.into());
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String, ParameterStoreError> {
        self.parameters
            .read()
            .expect("parameter store lock poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| ParameterStoreError::ParameterNotFound {
                name: name.to_string(),
            })
    }
}
