mod address_resolver;
mod coordinate_resolver;
mod identifier_provider;
mod remote_store;

pub use address_resolver::AddressResolver;
pub use coordinate_resolver::CoordinateResolver;
pub use identifier_provider::IdentifierProvider;
pub use remote_store::RemoteStore;
