//! OpenCellID Coordinate Resolver
//!
//! Implements CoordinateResolver for cell-tower identifiers.

use super::http::{build_client, fetch_json};
use crate::domain::entities::{Coordinates, NetworkIdentifier};
use crate::domain::errors::Result;
use crate::domain::ports::CoordinateResolver;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Cell-tower coordinate resolver backed by the OpenCellID API.
///
/// `GET <api_uri>?key=&mcc=&mnc=&lac=&cellid=&format=json`, answered with a
/// JSON object that decodes directly into [`Coordinates`].
pub struct OpenCellIdResolver {
    client: reqwest::Client,
    api_uri: String,
    api_key: String,
}

impl OpenCellIdResolver {
    pub fn new(api_uri: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_uri,
            api_key,
        })
    }
}

#[async_trait]
impl CoordinateResolver<NetworkIdentifier> for OpenCellIdResolver {
    async fn resolve_coordinates(
        &self,
        identifier: &NetworkIdentifier,
        cancel: &CancellationToken,
    ) -> Result<Coordinates> {
        let request = self.client.get(&self.api_uri).query(&[
            ("key", self.api_key.clone()),
            ("mcc", identifier.mcc.to_string()),
            ("mnc", identifier.mnc.to_string()),
            ("lac", identifier.lac.to_string()),
            ("cellid", identifier.cid.to_string()),
            ("format", "json".to_string()),
        ]);

        let coordinates: Coordinates = fetch_json(request, "opencellid", cancel).await?;
        tracing::debug!("cell {} resolved to {}", identifier, coordinates);
        Ok(coordinates)
    }
}
