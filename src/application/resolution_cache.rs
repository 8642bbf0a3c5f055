//! Resolution Cache - two-tier memoization of location lookups
//!
//! Tier one is an in-process pair of mappings guarded by one reader/writer
//! lock; tier two is the remote store. Entries are append-only and an entry
//! only becomes visible in process after it has been written to the store.

use crate::domain::entities::{Coordinates, Geolocation};
use crate::domain::errors::{LocateError, Result};
use crate::domain::ports::RemoteStore;
use crate::domain::value_objects::ResolutionSource;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct CacheMaps {
    /// Identifier (public IP) -> Coordinates
    coordinates: HashMap<String, Coordinates>,
    /// Coordinates -> Geolocation
    geolocations: HashMap<Coordinates, Geolocation>,
}

/// Two-tier cache of Identifier -> Coordinates and Coordinates -> Geolocation.
///
/// Readers share the lock and never block each other. The lock is never
/// held across an await point.
pub struct ResolutionCache {
    maps: RwLock<CacheMaps>,
    store: Arc<dyn RemoteStore>,
}

impl ResolutionCache {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            maps: RwLock::new(CacheMaps::default()),
            store,
        }
    }

    /// In-process lookup of the coordinates for an identifier.
    pub fn get_coordinates(&self, identifier: &str) -> Option<Coordinates> {
        self.maps.read().coordinates.get(identifier).copied()
    }

    /// In-process lookup of the geolocation for a coordinate pair.
    pub fn get_geolocation(&self, coordinates: &Coordinates) -> Option<Geolocation> {
        self.maps.read().geolocations.get(coordinates).cloned()
    }

    /// In-process lookup of both mappings under a single read lock.
    pub fn get_location(&self, identifier: &str) -> Option<(Coordinates, Geolocation)> {
        let maps = self.maps.read();
        let coordinates = *maps.coordinates.get(identifier)?;
        let geolocation = maps.geolocations.get(&coordinates)?.clone();
        Some((coordinates, geolocation))
    }

    /// Look up an identifier in process, then in the store.
    ///
    /// Issues at most one store read. A store hit warms the in-process
    /// mapping, which is safe since the entry is already durable.
    pub async fn find_coordinates(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<(Coordinates, ResolutionSource)>> {
        if let Some(c) = self.get_coordinates(identifier) {
            return Ok(Some((c, ResolutionSource::Memory)));
        }

        let stored: Option<Coordinates> = self.read_store(identifier, cancel).await?;
        Ok(stored.map(|c| {
            self.maps
                .write()
                .coordinates
                .entry(identifier.to_string())
                .or_insert(c);
            (c, ResolutionSource::Store)
        }))
    }

    /// Look up a coordinate pair in process, then in the store.
    pub async fn find_geolocation(
        &self,
        coordinates: Coordinates,
        cancel: &CancellationToken,
    ) -> Result<Option<(Geolocation, ResolutionSource)>> {
        if let Some(geo) = self.get_geolocation(&coordinates) {
            return Ok(Some((geo, ResolutionSource::Memory)));
        }

        let stored: Option<Geolocation> =
            self.read_store(&coordinates.store_key(), cancel).await?;
        Ok(stored.map(|geo| {
            self.maps
                .write()
                .geolocations
                .entry(coordinates)
                .or_insert_with(|| geo.clone());
            (geo, ResolutionSource::Store)
        }))
    }

    /// Persist Identifier -> Coordinates, then make it visible in process.
    pub async fn put_coordinates(
        &self,
        identifier: &str,
        coordinates: Coordinates,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.write_store(identifier, &coordinates, cancel).await?;
        self.maps
            .write()
            .coordinates
            .insert(identifier.to_string(), coordinates);
        Ok(())
    }

    /// Persist Coordinates -> Geolocation, then make it visible in process.
    pub async fn put_geolocation(
        &self,
        coordinates: Coordinates,
        geolocation: Geolocation,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.write_store(&coordinates.store_key(), &geolocation, cancel)
            .await?;
        self.maps
            .write()
            .geolocations
            .insert(coordinates, geolocation);
        Ok(())
    }

    /// Persist both mappings of a resolved identifier, then publish them
    /// together under one write lock.
    ///
    /// Mappings already held in process are not rewritten. If a store write
    /// fails the in-process tier is left untouched; an earlier store write of
    /// the same call may remain in the store.
    pub async fn put_location(
        &self,
        identifier: &str,
        coordinates: Coordinates,
        geolocation: Geolocation,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let (has_coordinates, has_geolocation) = {
            let maps = self.maps.read();
            (
                maps.coordinates.get(identifier) == Some(&coordinates),
                maps.geolocations.contains_key(&coordinates),
            )
        };

        // Geolocation first, so a stored identifier never points at a
        // missing address.
        if !has_geolocation {
            self.write_store(&coordinates.store_key(), &geolocation, cancel)
                .await?;
        }
        if !has_coordinates {
            self.write_store(identifier, &coordinates, cancel).await?;
        }

        let mut maps = self.maps.write();
        maps.geolocations.entry(coordinates).or_insert(geolocation);
        maps.coordinates.insert(identifier.to_string(), coordinates);
        Ok(())
    }

    /// Number of in-process Identifier -> Coordinates entries.
    pub fn coordinates_len(&self) -> usize {
        self.maps.read().coordinates.len()
    }

    /// Number of in-process Coordinates -> Geolocation entries.
    pub fn geolocations_len(&self) -> usize {
        self.maps.read().geolocations.len()
    }

    async fn read_store<T: DeserializeOwned>(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        match self.store.get(key, cancel).await? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                LocateError::store(format!("malformed stored value for {}: {}", key, e))
            }),
            None => Ok(None),
        }
    }

    async fn write_store<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| LocateError::store(format!("cannot encode value for {}: {}", key, e)))?;
        self.store.put(key, &raw, cancel).await
    }
}
