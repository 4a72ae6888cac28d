/// Observable stores and shared-blob persistence.
///
/// Provides the `Store` observable (subscribe/set/update with start/stop
/// lifecycle) that engine state is published through, and a
/// `PersistenceContext` that multiplexes many feature keys into one
/// JSON storage slot behind a pluggable `StorageBackend`.
pub mod config;
pub mod persist;
pub mod store;

pub use persist::{
    FileStorage, MemoryStorage, PersistedStore, PersistenceContext, StorageBackend,
};
pub use store::{Store, StoreSetter, Subscription, Teardown};
