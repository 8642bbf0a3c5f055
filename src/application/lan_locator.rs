//! LAN Locator
//!
//! Resolves the device's public IP address. Both Identifier -> Coordinates
//! and Coordinates -> Geolocation are cached, so an address that has been
//! seen before costs no external lookup.

use super::locator::{CycleState, Locator, Resolution};
use super::resolution_cache::ResolutionCache;
use crate::domain::entities::Coordinates;
use crate::domain::errors::Result;
use crate::domain::ports::{AddressResolver, CoordinateResolver, IdentifierProvider};
use crate::domain::value_objects::{LocatorState, ResolutionSource, StrategyKind};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct LanLocator {
    identifiers: Arc<dyn IdentifierProvider<String>>,
    coordinates: Arc<dyn CoordinateResolver<String>>,
    addresses: Arc<dyn AddressResolver>,
    cache: Arc<ResolutionCache>,
    cycle: CycleState,
}

impl LanLocator {
    pub fn new(
        identifiers: Arc<dyn IdentifierProvider<String>>,
        coordinates: Arc<dyn CoordinateResolver<String>>,
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

    /// Look an IP up in memory, then in the store.
    async fn cached_location(
        &self,
        ip: &str,
        cancel: &CancellationToken,
    ) -> Result<CachedLocation> {
        if let Some((coordinates, geolocation)) = self.cache.get_location(ip) {
            return Ok(CachedLocation::Hit(Resolution {
                coordinates,
                geolocation,
                source: ResolutionSource::Memory,
            }));
        }

        let Some((coordinates, _)) = self.cache.find_coordinates(ip, cancel).await? else {
            return Ok(CachedLocation::Miss);
        };
        match self.cache.find_geolocation(coordinates, cancel).await? {
            Some((geolocation, _)) => Ok(CachedLocation::Hit(Resolution {
                coordinates,
                geolocation,
                source: ResolutionSource::Store,
            })),
            None => Ok(CachedLocation::CoordinatesOnly(coordinates)),
        }
    }
}

enum CachedLocation {
    Hit(Resolution),
    /// Coordinates known, geolocation missing in both tiers.
    CoordinatesOnly(Coordinates),
    Miss,
}

#[async_trait]
impl Locator for LanLocator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Lan
    }

    fn state(&self) -> LocatorState {
        self.cycle.current()
    }

    async fn locate(&self, cancel: &CancellationToken) -> Result<Resolution> {
        let cycle = self.cycle.begin().await;

        cycle.enter(LocatorState::CheckCache);
        let ip = self.identifiers.current(cancel).await?;

        let known_coordinates = match self.cached_location(&ip, cancel).await? {
            CachedLocation::Hit(resolution) => {
                cycle.enter(LocatorState::CacheHit);
                tracing::info!(
                    "ip {} already known ({}): {}",
                    ip,
                    resolution.source,
                    resolution.coordinates
                );
                return Ok(resolution);
            }
            CachedLocation::CoordinatesOnly(coordinates) => Some(coordinates),
            CachedLocation::Miss => None,
        };

        cycle.enter(LocatorState::CacheMiss);
        let coordinates = match known_coordinates {
            Some(coordinates) => {
                tracing::info!("ip {} at {} has no address yet", ip, coordinates);
                coordinates
            }
            None => {
                tracing::info!("new ip {}, resolving location", ip);
                cycle.enter(LocatorState::ResolveIdentifier);
                self.coordinates.resolve_coordinates(&ip, cancel).await?
            }
        };

        // Another address may already have resolved to the same coordinates
        cycle.enter(LocatorState::ResolveAddress);
        let geolocation = match self.cache.get_geolocation(&coordinates) {
            Some(geo) => geo,
            None => self.addresses.resolve_address(coordinates, cancel).await?,
        };

        cycle.enter(LocatorState::PersistAndCache);
        self.cache
            .put_location(&ip, coordinates, geolocation.clone(), cancel)
            .await?;

        Ok(Resolution {
            coordinates,
            geolocation,
            source: ResolutionSource::External,
        })
    }
}
