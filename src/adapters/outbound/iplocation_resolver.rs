//! IP Geolocation Coordinate Resolver
//!
//! Implements CoordinateResolver for public IP addresses.

use super::http::{build_client, fetch_json};
use crate::domain::entities::Coordinates;
use crate::domain::errors::{LocateError, Result};
use crate::domain::ports::CoordinateResolver;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// IP-based coordinate resolver.
///
/// `GET <api_uri>/<api_key>/<ip>`; coordinates are taken from the
/// `location.latitude` / `location.longitude` path of the answer.
pub struct IpLocationResolver {
    client: reqwest::Client,
    api_uri: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    #[serde(default)]
    success: Option<bool>,
    location: Option<IpLocation>,
}

#[derive(Debug, Deserialize)]
struct IpLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl IpLocationResolver {
    pub fn new(api_uri: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_uri: api_uri.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl CoordinateResolver<String> for IpLocationResolver {
    async fn resolve_coordinates(
        &self,
        identifier: &String,
        cancel: &CancellationToken,
    ) -> Result<Coordinates> {
        let url = format!("{}/{}/{}", self.api_uri, self.api_key, identifier);
        let resp: IpLocationResponse = fetch_json(self.client.get(&url), "iplocation", cancel).await?;

        if resp.success == Some(false) {
            return Err(LocateError::external(format!(
                "iplocation could not locate {}",
                identifier
            )));
        }

        match resp.location {
            Some(IpLocation {
                latitude: Some(lat),
                longitude: Some(lon),
            }) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocateError::decode(
                "iplocation response has no location.latitude/longitude",
            )),
        }
    }
}
