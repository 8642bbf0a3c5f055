//! Domain Errors
//!
//! Error taxonomy shared by every port and locator.

/// Errors raised while resolving a location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    /// No modem is installed; selects the LAN strategy at startup.
    #[error("location provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// An external HTTP or subprocess lookup failed or returned no usable data.
    #[error("external lookup failed: {0}")]
    ExternalLookup(String),
    /// The remote store was unreachable or answered with malformed data.
    #[error("store error: {0}")]
    Store(String),
    /// A response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// The operation was interrupted by shutdown.
    #[error("operation cancelled")]
    Cancelled,
}

impl LocateError {
    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalLookup(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LocateError>;
