//! Application Layer
//!
//! Locators, the two-tier resolution cache and the server that schedules them.

pub mod cellular_locator;
pub mod lan_locator;
pub mod locator;
pub mod resolution_cache;
pub mod resolution_server;

#[cfg(test)]
pub(crate) mod test_support;

pub use cellular_locator::CellularLocator;
pub use lan_locator::LanLocator;
pub use locator::{run_locator, Locator, Resolution, Strategy};
pub use resolution_cache::ResolutionCache;
pub use resolution_server::ResolutionServer;
