//! Mock port implementations shared by the application tests.

use crate::adapters::outbound::DashMapRemoteStore;
use crate::domain::entities::{Coordinates, Geolocation};
use crate::domain::errors::{LocateError, Result};
use crate::domain::ports::{AddressResolver, CoordinateResolver, IdentifierProvider, RemoteStore};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub fn timisoara() -> Geolocation {
    Geolocation {
        name: "Piața Victoriei".to_string(),
        country: "Romania".to_string(),
        country_code: "ro".to_string(),
        city: "Timișoara".to_string(),
        postcode: "300006".to_string(),
        ..Default::default()
    }
}

// ===== Store =====

/// In-memory store that counts calls and can be switched to failing.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: DashMapRemoteStore,
    gets: Arc<AtomicUsize>,
    puts: Arc<AtomicUsize>,
    fail_gets: Arc<AtomicBool>,
    fail_puts: Arc<AtomicBool>,
    fail_put_number: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed<T: Serialize>(&self, key: &str, value: &T) {
        self.seed_raw(key, &serde_json::to_string(value).unwrap());
    }

    pub fn seed_raw(&self, key: &str, value: &str) {
        self.inner.inner().insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.inner().get(key).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Fail only the `n`-th put (1-based); 0 disables.
    pub fn fail_put_number(&self, n: usize) {
        self.fail_put_number.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteStore for RecordingStore {
    async fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(LocateError::store("store unreachable"));
        }
        self.inner.get(key, cancel).await
    }

    async fn put(&self, key: &str, value: &str, cancel: &CancellationToken) -> Result<()> {
        let number = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_puts.load(Ordering::SeqCst)
            || self.fail_put_number.load(Ordering::SeqCst) == number
        {
            return Err(LocateError::store("store unreachable"));
        }
        self.inner.put(key, value, cancel).await
    }
}

// ===== Identifier Provider =====

pub struct MockIdentifierProvider<I> {
    value: Mutex<Result<I>>,
    calls: AtomicUsize,
}

impl<I: Clone> MockIdentifierProvider<I> {
    pub fn new(value: I) -> Self {
        Self {
            value: Mutex::new(Ok(value)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, value: I) {
        *self.value.lock() = Ok(value);
    }

    pub fn fail(&self, err: LocateError) {
        *self.value.lock() = Err(err);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I: Clone + Send + Sync> IdentifierProvider<I> for MockIdentifierProvider<I> {
    async fn current(&self, _cancel: &CancellationToken) -> Result<I> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value.lock().clone()
    }
}

// ===== Coordinate Resolver =====

/// Answers from a table keyed by the identifier's display form.
#[derive(Default)]
pub struct MockCoordinateResolver {
    answers: Mutex<HashMap<String, Result<Coordinates>>>,
    calls: Mutex<Vec<String>>,
}

impl MockCoordinateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, identifier: impl Display, result: Result<Coordinates>) {
        self.answers
            .lock()
            .insert(identifier.to_string(), result);
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_for(&self, identifier: impl Display) -> usize {
        let key = identifier.to_string();
        self.calls.lock().iter().filter(|c| **c == key).count()
    }
}

#[async_trait]
impl<I: Display + Sync> CoordinateResolver<I> for MockCoordinateResolver {
    async fn resolve_coordinates(
        &self,
        identifier: &I,
        _cancel: &CancellationToken,
    ) -> Result<Coordinates> {
        let key = identifier.to_string();
        self.calls.lock().push(key.clone());
        self.answers
            .lock()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(LocateError::external(format!("no answer for {}", key))))
    }
}

// ===== Address Resolver =====

#[derive(Default)]
pub struct MockAddressResolver {
    answers: Mutex<HashMap<Coordinates, Result<Geolocation>>>,
    calls: AtomicUsize,
}

impl MockAddressResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, coordinates: Coordinates, result: Result<Geolocation>) {
        self.answers.lock().insert(coordinates, result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressResolver for MockAddressResolver {
    async fn resolve_address(
        &self,
        coordinates: Coordinates,
        _cancel: &CancellationToken,
    ) -> Result<Geolocation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .get(&coordinates)
            .cloned()
            .unwrap_or_else(|| {
                Err(LocateError::external(format!(
                    "geocoding returned no results for {}",
                    coordinates
                )))
            })
    }
}
