//! Coordinate Resolver Port
//!
//! Defines the interface for turning a location identifier into coordinates.

use crate::domain::entities::Coordinates;
use crate::domain::errors::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Resolver from a strategy-specific identifier to coordinates.
///
/// This is an outbound port. The cellular strategy resolves a
/// `NetworkIdentifier` (cell tower lookup), the LAN strategy resolves a
/// public IP address string.
#[async_trait]
pub trait CoordinateResolver<I: Sync>: Send + Sync {
    /// Resolve the identifier with a single external call.
    ///
    /// Fails with `ExternalLookup` on transport errors or non-2xx answers and
    /// with `Decode` when the body does not carry coordinates.
    async fn resolve_coordinates(&self, identifier: &I, cancel: &CancellationToken)
        -> Result<Coordinates>;
}
