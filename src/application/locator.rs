//! Locator - strategy-agnostic resolution interface
//!
//! A locator turns one trigger into one resolution cycle. The two strategies
//! live behind the [`Locator`] trait and are selected once, at startup, as a
//! [`Strategy`] value.

use super::cellular_locator::CellularLocator;
use super::lan_locator::LanLocator;
use crate::domain::entities::{Coordinates, Geolocation};
use crate::domain::errors::{LocateError, Result};
use crate::domain::value_objects::{LocatorState, ResolutionSource, StrategyKind};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Outcome of a successful resolution cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub coordinates: Coordinates,
    pub geolocation: Geolocation,
    pub source: ResolutionSource,
}

/// Common resolution interface of both strategies.
#[async_trait]
pub trait Locator: Send + Sync {
    /// Which strategy this locator implements.
    fn kind(&self) -> StrategyKind;

    /// Current state of the resolution state machine.
    fn state(&self) -> LocatorState;

    /// Run one resolution cycle.
    ///
    /// On error the in-process cache is unchanged. A store write made before
    /// a later one failed may remain in the store as an orphaned entry.
    async fn locate(&self, cancel: &CancellationToken) -> Result<Resolution>;
}

/// Strategy chosen at startup.
pub enum Strategy {
    Cellular(CellularLocator),
    Lan(LanLocator),
}

#[async_trait]
impl Locator for Strategy {
    fn kind(&self) -> StrategyKind {
        match self {
            Self::Cellular(l) => l.kind(),
            Self::Lan(l) => l.kind(),
        }
    }

    fn state(&self) -> LocatorState {
        match self {
            Self::Cellular(l) => l.state(),
            Self::Lan(l) => l.state(),
        }
    }

    async fn locate(&self, cancel: &CancellationToken) -> Result<Resolution> {
        match self {
            Self::Cellular(l) => l.locate(cancel).await,
            Self::Lan(l) => l.locate(cancel).await,
        }
    }
}

/// State of a locator plus the lock serializing its cycles.
#[derive(Default)]
pub(crate) struct CycleState {
    state: Mutex<LocatorState>,
    cycle: tokio::sync::Mutex<()>,
}

impl CycleState {
    pub(crate) fn current(&self) -> LocatorState {
        *self.state.lock()
    }

    /// Wait for any running cycle to finish, then start a new one.
    pub(crate) async fn begin(&self) -> CycleGuard<'_> {
        let permit = self.cycle.lock().await;
        CycleGuard {
            state: &self.state,
            _permit: permit,
        }
    }
}

/// RAII guard for one resolution cycle.
///
/// Returns the state machine to `Idle` when dropped, on success, error or
/// cancellation alike.
pub(crate) struct CycleGuard<'a> {
    state: &'a Mutex<LocatorState>,
    _permit: tokio::sync::MutexGuard<'a, ()>,
}

impl CycleGuard<'_> {
    pub(crate) fn enter(&self, next: LocatorState) {
        let mut state = self.state.lock();
        tracing::trace!("locator {} -> {}", *state, next);
        *state = next;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = LocatorState::Idle;
    }
}

/// Drive a locator from a trigger channel until cancelled.
///
/// Triggers are consumed one at a time. A failed cycle is logged and the
/// loop waits for the next trigger; successful results are forwarded.
pub async fn run_locator(
    locator: Arc<dyn Locator>,
    mut triggers: mpsc::Receiver<()>,
    results: mpsc::Sender<Geolocation>,
    cancel: CancellationToken,
) {
    let kind = locator.kind();

    loop {
        let trigger = tokio::select! {
            _ = cancel.cancelled() => break,
            t = triggers.recv() => t,
        };
        if trigger.is_none() {
            break;
        }

        match locator.locate(&cancel).await {
            Ok(resolution) => {
                // Hits are logged by the locator itself
                if !resolution.source.is_known() {
                    tracing::info!(
                        "{} locator: resolved new location at {}",
                        kind,
                        resolution.coordinates
                    );
                }
                if results.send(resolution.geolocation).await.is_err() {
                    break;
                }
            }
            Err(LocateError::Cancelled) => break,
            Err(e) => {
                tracing::warn!("{} locator: resolution cycle aborted: {}", kind, e);
            }
        }
    }

    tracing::debug!("{} locator stopped", kind);
}
