mod dashmap_remote_store;
mod geocoding_resolver;
mod http;
mod http_remote_store;
mod ipify_provider;
mod iplocation_resolver;
mod modem_provider;
mod opencellid_resolver;

pub use dashmap_remote_store::DashMapRemoteStore;
pub use geocoding_resolver::GeocodingResolver;
pub use http_remote_store::{HttpRemoteStore, DEFAULT_STORE_TIMEOUT};
pub use ipify_provider::IpifyProvider;
pub use iplocation_resolver::IpLocationResolver;
pub use modem_provider::ModemIdentifierProvider;
pub use opencellid_resolver::OpenCellIdResolver;
