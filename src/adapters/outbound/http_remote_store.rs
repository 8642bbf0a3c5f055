//! HTTP Remote Store
//!
//! Implements RemoteStore against the key/value store service's
//! `<addr>/collection` endpoint.

use super::http::{build_client, read_body, send};
use crate::domain::errors::{LocateError, Result};
use crate::domain::ports::RemoteStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default request timeout of the store client.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Key/value store client.
///
/// - `GET <addr>/collection` with the raw key as body, answered with a
///   `{"<key>": "<value>"}` document (404, a missing key or an empty value
///   mean "not found").
/// - `POST <addr>/collection` with a `{"<key>": "<value>"}` document.
///
/// No retries: a failed call surfaces as `LocateError::Store`.
pub struct HttpRemoteStore {
    client: reqwest::Client,
    url: String,
}

impl HttpRemoteStore {
    pub fn new(addr: &str, timeout: Duration) -> anyhow::Result<Self> {
        let addr = addr.trim_end_matches('/');
        let base = if addr.starts_with("http://") || addr.starts_with("https://") {
            addr.to_string()
        } else {
            format!("http://{}", addr)
        };

        Ok(Self {
            client: build_client(timeout)?,
            url: format!("{}/collection", base),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn store_err(e: LocateError) -> LocateError {
    match e {
        LocateError::ExternalLookup(msg) | LocateError::Decode(msg) => LocateError::Store(msg),
        other => other,
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<String>> {
        let request = self.client.get(&self.url).body(key.to_string());
        let response = send(request, "store get", cancel).await.map_err(store_err)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LocateError::store(format!("store get returned status {}", status)));
        }

        let body = read_body(response, "store get", cancel)
            .await
            .map_err(store_err)?;
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }

        let mut doc: HashMap<String, String> = serde_json::from_slice(&body)
            .map_err(|e| LocateError::store(format!("malformed store document: {}", e)))?;

        Ok(doc.remove(key).filter(|v| !v.is_empty()))
    }

    async fn put(&self, key: &str, value: &str, cancel: &CancellationToken) -> Result<()> {
        let mut doc = HashMap::with_capacity(1);
        doc.insert(key, value);

        let request = self.client.post(&self.url).json(&doc);
        let response = send(request, "store post", cancel).await.map_err(store_err)?;

        if !response.status().is_success() {
            return Err(LocateError::store(format!(
                "store post returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
