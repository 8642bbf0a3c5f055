//! Resolution Server - strategy selection and trigger scheduling
//!
//! Picks the locator once at startup from modem availability, triggers it
//! immediately and then on a fixed interval, and keeps the last known
//! location until shutdown.

use super::cellular_locator::CellularLocator;
use super::lan_locator::LanLocator;
use super::locator::{run_locator, Locator, Strategy};
use super::resolution_cache::ResolutionCache;
use crate::adapters::outbound::{
    DashMapRemoteStore, GeocodingResolver, HttpRemoteStore, IpLocationResolver, IpifyProvider,
    ModemIdentifierProvider, OpenCellIdResolver,
};
use crate::config::{Config, MEMORY_STORE};
use crate::domain::entities::Geolocation;
use crate::domain::ports::{AddressResolver, RemoteStore};
use crate::domain::value_objects::StrategyKind;
use crate::infrastructure::modem::{Modem, ModemError};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Trigger period used when a zero interval is configured.
pub const DEFAULT_TRIGGER_INTERVAL: Duration = Duration::from_secs(10);

/// Orchestrates the active locator.
pub struct ResolutionServer {
    locator: Arc<dyn Locator>,
    modem: Option<(Arc<Modem>, Duration)>,
    trigger_interval: Duration,
    location_tx: watch::Sender<Option<Geolocation>>,
}

impl ResolutionServer {
    pub fn new(locator: Arc<dyn Locator>, trigger_interval: Duration) -> Self {
        let (location_tx, _) = watch::channel(None);
        let trigger_interval = if trigger_interval.is_zero() {
            tracing::warn!(
                "zero trigger interval, using {:?}",
                DEFAULT_TRIGGER_INTERVAL
            );
            DEFAULT_TRIGGER_INTERVAL
        } else {
            trigger_interval
        };
        Self {
            locator,
            modem: None,
            trigger_interval,
            location_tx,
        }
    }

    /// Keep the modem's network state fresh while the server runs.
    pub fn with_modem(mut self, modem: Arc<Modem>, refresh_interval: Duration) -> Self {
        self.modem = Some((modem, refresh_interval));
        self
    }

    /// Build the server from configuration, probing for a modem.
    ///
    /// A missing modem selects the LAN strategy. A modem that is present but
    /// fails to initialize is a fatal error.
    pub async fn from_config(cfg: &Config, cancel: &CancellationToken) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(cfg.lookup_timeout_secs);
        let trigger_interval = Duration::from_secs(cfg.trigger_interval_secs);

        let cache = Arc::new(ResolutionCache::new(build_store(cfg)?));
        let addresses: Arc<dyn AddressResolver> = Arc::new(GeocodingResolver::new(
            cfg.geocoding_api_uri.clone(),
            cfg.geocoding_api_key.clone(),
            timeout,
        )?);

        match Modem::probe(&cfg.modem_command, timeout) {
            Ok(modem) => {
                let modem = Arc::new(modem);
                modem
                    .init(cancel)
                    .await
                    .context("modem initialization failed")?;

                let locator = CellularLocator::new(
                    Arc::new(ModemIdentifierProvider::new(modem.clone())),
                    Arc::new(OpenCellIdResolver::new(
                        cfg.opencellid_api_uri.clone(),
                        cfg.opencellid_api_key.clone(),
                        timeout,
                    )?),
                    addresses,
                    cache,
                );

                tracing::info!("starting resolution server with cellular locator");
                Ok(
                    Self::new(Arc::new(Strategy::Cellular(locator)), trigger_interval)
                        .with_modem(modem, Duration::from_secs(cfg.modem_refresh_secs)),
                )
            }
            Err(ModemError::NotPresent(reason)) => {
                tracing::info!("{}, falling back to LAN locator", reason);

                let locator = LanLocator::new(
                    Arc::new(IpifyProvider::new(cfg.ipify_api_uri.clone(), timeout)?),
                    Arc::new(IpLocationResolver::new(
                        cfg.iplocation_api_uri.clone(),
                        cfg.iplocation_api_key.clone(),
                        timeout,
                    )?),
                    addresses,
                    cache,
                );

                tracing::info!("starting resolution server with LAN locator");
                Ok(Self::new(Arc::new(Strategy::Lan(locator)), trigger_interval))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Probe, build and run until `cancel` fires.
    pub async fn start(cfg: &Config, cancel: CancellationToken) -> anyhow::Result<()> {
        let server = Self::from_config(cfg, &cancel).await?;
        server.run(cancel).await
    }

    pub fn strategy(&self) -> StrategyKind {
        self.locator.kind()
    }

    /// Latest successfully resolved location.
    pub fn last_location(&self) -> Option<Geolocation> {
        self.location_tx.borrow().clone()
    }

    /// Watch the last known location.
    pub fn subscribe(&self) -> watch::Receiver<Option<Geolocation>> {
        self.location_tx.subscribe()
    }

    /// Run the trigger loop until `cancel` fires.
    ///
    /// The locator and the modem refresh task run in the background and are
    /// cancelled and joined before this returns.
    pub async fn run(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        let (result_tx, mut result_rx) = mpsc::channel(8);
        let tasks_cancel = cancel.child_token();

        let mut tasks = Vec::new();
        if let Some((modem, refresh)) = &self.modem {
            tasks.push(tokio::spawn(
                modem.clone().run(*refresh, tasks_cancel.clone()),
            ));
        }
        tasks.push(tokio::spawn(run_locator(
            self.locator.clone(),
            trigger_rx,
            result_tx,
            tasks_cancel.clone(),
        )));

        tracing::info!(
            "resolution server running ({} locator, every {:?})",
            self.locator.kind(),
            self.trigger_interval
        );

        // First trigger right away, then on the interval
        self.trigger(&trigger_tx);
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.trigger_interval,
            self.trigger_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.trigger(&trigger_tx),
                Some(geolocation) = result_rx.recv() => self.record(geolocation),
            }
        }

        tasks_cancel.cancel();
        drop(trigger_tx);
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("background task failed: {}", e);
            }
        }

        tracing::info!("resolution server stopped");
        Ok(())
    }

    fn trigger(&self, triggers: &mpsc::Sender<()>) {
        match triggers.try_send(()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::debug!("locator busy, skipping trigger");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::warn!("locator stopped, trigger dropped");
            }
        }
    }

    fn record(&self, geolocation: Geolocation) {
        tracing::info!(
            city = %geolocation.city,
            country = %geolocation.country,
            "new geolocation received: {}",
            geolocation.address_line1
        );
        self.location_tx.send_replace(Some(geolocation));
    }
}

fn build_store(cfg: &Config) -> anyhow::Result<Arc<dyn RemoteStore>> {
    if cfg.store_addr == MEMORY_STORE {
        tracing::warn!("using in-process store, locations will not survive restarts");
        return Ok(Arc::new(DashMapRemoteStore::new()));
    }

    let store = HttpRemoteStore::new(
        &cfg.store_addr,
        Duration::from_millis(cfg.store_timeout_ms),
    )?;
    tracing::info!("remote store at {}", store.url());
    Ok(Arc::new(store))
}
