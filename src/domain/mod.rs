//! Domain Layer
//!
//! Entities, value objects, errors and the outbound ports the application
//! layer depends on.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod value_objects;

pub use entities::{Coordinates, Geolocation, NetworkIdentifier};
pub use errors::{LocateError, Result};
pub use value_objects::{LocatorState, ResolutionSource, StrategyKind};
