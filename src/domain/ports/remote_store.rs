//! Remote Store Port
//!
//! Defines the key/value contract of the persistent location store.

use crate::domain::errors::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Persistent string key/value store mirrored by the resolution cache.
///
/// Keys and values are opaque strings; the cache decides their encoding.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    async fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<String>>;

    /// Durably write `value` under `key`.
    async fn put(&self, key: &str, value: &str, cancel: &CancellationToken) -> Result<()>;
}
