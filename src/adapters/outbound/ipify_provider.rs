//! Ipify Identifier Provider
//!
//! Discovers the device's public IP address for the LAN strategy.

use super::http::{build_client, fetch_json};
use crate::domain::errors::{LocateError, Result};
use crate::domain::ports::IdentifierProvider;
use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Public IP discovery through an ipify-compatible endpoint (`{"ip": "..."}`).
pub struct IpifyProvider {
    client: reqwest::Client,
    api_uri: String,
}

#[derive(Debug, Deserialize)]
struct IpifyResponse {
    ip: String,
}

impl IpifyProvider {
    pub fn new(api_uri: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_uri,
        })
    }
}

#[async_trait]
impl IdentifierProvider<String> for IpifyProvider {
    async fn current(&self, cancel: &CancellationToken) -> Result<String> {
        let resp: IpifyResponse = fetch_json(self.client.get(&self.api_uri), "ipify", cancel).await?;
        let ip = resp.ip.trim();

        // Normalised through IpAddr so equal addresses share one cache key
        let addr: IpAddr = ip
            .parse()
            .map_err(|_| LocateError::decode(format!("ipify returned invalid address {:?}", ip)))?;

        tracing::debug!("public IP detected: {}", addr);
        Ok(addr.to_string())
    }
}
