//! Identifier Provider Port
//!
//! Supplies the raw identifier a locator resolves on each cycle.

use crate::domain::errors::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Source of the current location identifier.
///
/// Re-read on every resolution cycle: the modem's current cell for the
/// cellular strategy, the public IP address for the LAN strategy.
#[async_trait]
pub trait IdentifierProvider<I: Send>: Send + Sync {
    async fn current(&self, cancel: &CancellationToken) -> Result<I>;
}
