//! Domain Entities - Core location objects
//!
//! These entities represent the core concepts of the locater domain.
//! They have no external dependencies and contain only business logic.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A latitude/longitude pair in signed decimal degrees.
///
/// Used as a cache key for the Coordinates -> Geolocation mapping, so it
/// implements `Eq` and `Hash` over the bit patterns of its components.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Key under which this pair is stored in the remote store.
    ///
    /// Same shape as the JSON encoding: `{"lat":45.99,"lon":23.25}`.
    /// Signed zeros are normalised, matching `Eq`/`Hash`.
    pub fn store_key(&self) -> String {
        let key = Self::new(normalize_zero(self.lat), normalize_zero(self.lon));
        serde_json::to_string(&key)
            .unwrap_or_else(|_| format!("{{\"lat\":{},\"lon\":{}}}", key.lat, key.lon))
    }

    fn key_bits(&self) -> (u64, u64) {
        (
            normalize_zero(self.lat).to_bits(),
            normalize_zero(self.lon).to_bits(),
        )
    }
}

// -0.0 and 0.0 compare equal as floats, so both collapse to one key.
fn normalize_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for Coordinates {}

impl Hash for Coordinates {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Structured address record produced by the geocoding lookup.
///
/// Every field is optional on the wire; missing fields decode to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geolocation {
    pub name: String,
    pub country: String,
    pub country_code: String,
    pub city: String,
    pub postcode: String,
    pub district: String,
    pub suburb: String,
    pub street: String,
    pub address_line1: String,
    pub category: String,
}

/// Identifiers of the cell tower the modem is currently attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkIdentifier {
    /// Mobile country code
    pub mcc: u16,
    /// Mobile network code
    pub mnc: u16,
    /// Cell identifier
    pub cid: u32,
    /// Location area code
    pub lac: u32,
}

impl NetworkIdentifier {
    pub fn new(mcc: u16, mnc: u16, cid: u32, lac: u32) -> Self {
        Self { mcc, mnc, cid, lac }
    }
}

impl std::fmt::Display for NetworkIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mcc={} mnc={} lac={} cid={}",
            self.mcc, self.mnc, self.lac, self.cid
        )
    }
}
