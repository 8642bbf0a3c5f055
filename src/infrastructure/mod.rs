//! Infrastructure Layer
//!
//! Modem collaborator and process-wide shutdown coordination.

pub mod modem;
pub mod shutdown;

pub use modem::{
    DeviceInfo, Modem, ModemError, NetworkState, WirelessDataService, DEFAULT_MODEM_COMMAND,
};
pub use shutdown::{shutdown_signal, ShutdownController};
