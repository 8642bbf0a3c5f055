//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// Resolution strategy, chosen once at startup from modem availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Cell-tower lookup through the modem's network identifiers
    Cellular,
    /// Public IP geolocation (fallback when no modem is present)
    Lan,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cellular => "cellular",
            Self::Lan => "lan",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the result of a resolution cycle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// Served from the in-process mapping
    Memory,
    /// Served from the remote store
    Store,
    /// Resolved through the external APIs and persisted
    External,
}

impl ResolutionSource {
    /// Whether the location had been seen before this cycle.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::External)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Store => "store",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// States a locator moves through during one resolution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorState {
    Idle,
    CheckCache,
    CacheHit,
    CacheMiss,
    ResolveIdentifier,
    ResolveAddress,
    PersistAndCache,
}

impl LocatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CheckCache => "check_cache",
            Self::CacheHit => "cache_hit",
            Self::CacheMiss => "cache_miss",
            Self::ResolveIdentifier => "resolve_identifier",
            Self::ResolveAddress => "resolve_address",
            Self::PersistAndCache => "persist_and_cache",
        }
    }
}

impl Default for LocatorState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for LocatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
