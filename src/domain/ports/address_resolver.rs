//! Address Resolver Port
//!
//! Defines the interface for reverse geocoding coordinates into an address.

use crate::domain::entities::{Coordinates, Geolocation};
use crate::domain::errors::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Reverse geocoder shared by both strategies.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve coordinates to the first matching address record.
    ///
    /// A lookup that yields zero results is an `ExternalLookup` error,
    /// never an empty success.
    async fn resolve_address(
        &self,
        coordinates: Coordinates,
        cancel: &CancellationToken,
    ) -> Result<Geolocation>;
}
