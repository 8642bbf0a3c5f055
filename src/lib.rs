//! locater library
//!
//! Exposes the resolution engine for use in integration tests and as a
//! library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{CellularLocator, LanLocator, Locator, ResolutionCache, ResolutionServer};
pub use config::{load_config, Config};
pub use domain::entities::{Coordinates, Geolocation, NetworkIdentifier};
pub use domain::errors::LocateError;
pub use domain::ports::{AddressResolver, CoordinateResolver, IdentifierProvider, RemoteStore};
pub use domain::value_objects::{LocatorState, ResolutionSource, StrategyKind};
