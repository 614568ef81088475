//! # twoem-database
//!
//! Persistence for the TWOEM portal. The [`store`] module defines the store
//! traits the services depend on; [`repositories`] implements them on
//! PostgreSQL and [`memory`] implements them on process-local maps.
//!
//! Every mutating store method is a single atomic read-modify-write: a
//! conditional `UPDATE … RETURNING`, a transaction holding a row lock, or
//! (in memory) work done under the map entry lock.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use repositories::{
    AccountRepository, ContentRepository, ResetRepository, StudentRepository,
};
pub use store::{AccountStore, ContentStore, ResetStore, Stores, StudentStore};
