//! Cellular Locator
//!
//! Resolves the serving cell to coordinates on every cycle and caches only
//! Coordinates -> Geolocation. Cell identifiers are not used as cache keys.

use super::locator::{CycleState, Locator, Resolution};
use super::resolution_cache::ResolutionCache;
use crate::domain::entities::NetworkIdentifier;
use crate::domain::errors::Result;
use crate::domain::ports::{AddressResolver, CoordinateResolver, IdentifierProvider};
use crate::domain::value_objects::{LocatorState, ResolutionSource, StrategyKind};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct CellularLocator {
    identifiers: Arc<dyn IdentifierProvider<NetworkIdentifier>>,
    coordinates: Arc<dyn CoordinateResolver<NetworkIdentifier>>,
    addresses: Arc<dyn AddressResolver>,
    cache: Arc<ResolutionCache>,
    cycle: CycleState,
}

impl CellularLocator {
    pub fn new(
        identifiers: Arc<dyn IdentifierProvider<NetworkIdentifier>>,
        coordinates: Arc<dyn CoordinateResolver<NetworkIdentifier>>,
        addresses: Arc<dyn AddressResolver>,
        cache: Arc<ResolutionCache>,
    ) -> Self {
        Self {
            identifiers,
            coordinates,
            addresses,
            cache,
            cycle: CycleState::default(),
        }
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }
}

#[async_trait]
impl Locator for CellularLocator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Cellular
    }

    fn state(&self) -> LocatorState {
        self.cycle.current()
    }

    async fn locate(&self, cancel: &CancellationToken) -> Result<Resolution> {
        let cycle = self.cycle.begin().await;

        cycle.enter(LocatorState::ResolveIdentifier);
        let cell = self.identifiers.current(cancel).await?;
        let coordinates = self.coordinates.resolve_coordinates(&cell, cancel).await?;

        cycle.enter(LocatorState::CheckCache);
        if let Some((geolocation, source)) = self.cache.find_geolocation(coordinates, cancel).await? {
            cycle.enter(LocatorState::CacheHit);
            tracing::info!("cell {} at {} already known", cell, coordinates);
            return Ok(Resolution {
                coordinates,
                geolocation,
                source,
            });
        }

        cycle.enter(LocatorState::CacheMiss);
        cycle.enter(LocatorState::ResolveAddress);
        let geolocation = self.addresses.resolve_address(coordinates, cancel).await?;

        cycle.enter(LocatorState::PersistAndCache);
        self.cache
            .put_geolocation(coordinates, geolocation.clone(), cancel)
            .await?;

        Ok(Resolution {
            coordinates,
            geolocation,
            source: ResolutionSource::External,
        })
    }
}
