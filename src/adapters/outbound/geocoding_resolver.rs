//! Geocoding Address Resolver
//!
//! Implements AddressResolver with a reverse geocoding HTTP API.

use super::http::{build_client, fetch_json};
use crate::domain::entities::{Coordinates, Geolocation};
use crate::domain::errors::{LocateError, Result};
use crate::domain::ports::AddressResolver;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Reverse geocoder.
///
/// `GET <api_uri>?lat=&lon=&format=json&apiKey=`, answered with a `results`
/// array whose first element is the address.
pub struct GeocodingResolver {
    client: reqwest::Client,
    api_uri: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Geolocation>,
}

impl GeocodingResolver {
    pub fn new(api_uri: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_uri,
            api_key,
        })
    }
}

#[async_trait]
impl AddressResolver for GeocodingResolver {
    async fn resolve_address(
        &self,
        coordinates: Coordinates,
        cancel: &CancellationToken,
    ) -> Result<Geolocation> {
        let request = self.client.get(&self.api_uri).query(&[
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lon.to_string()),
            ("format", "json".to_string()),
            ("apiKey", self.api_key.clone()),
        ]);

        let resp: GeocodingResponse = fetch_json(request, "geocoding", cancel).await?;

        resp.results.into_iter().next().ok_or_else(|| {
            LocateError::external(format!("geocoding returned no results for {}", coordinates))
        })
    }
}
