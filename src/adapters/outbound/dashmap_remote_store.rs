//! DashMap Remote Store
//!
//! Implements RemoteStore in process memory, for deployments without the
//! store service and for tests.

use crate::domain::errors::Result;
use crate::domain::ports::RemoteStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// DashMap-backed key/value store.
///
/// Not durable across restarts.
#[derive(Clone, Default)]
pub struct DashMapRemoteStore {
    entries: Arc<DashMap<String, String>>,
}

impl DashMapRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the underlying DashMap (for seeding and inspection).
    pub fn inner(&self) -> &Arc<DashMap<String, String>> {
        &self.entries
    }
}

#[async_trait]
impl RemoteStore for DashMapRemoteStore {
    async fn get(&self, key: &str, _cancel: &CancellationToken) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn put(&self, key: &str, value: &str, _cancel: &CancellationToken) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
