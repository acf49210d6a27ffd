//! Document store adapter.
//!
//! This crate provides:
//! - The async [`DocumentStore`] contract used by the API handlers
//! - A Firestore REST backend (also usable against the emulator)
//! - An in-process backend for local runs and tests

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod store;
pub mod token_cache;
pub mod types;

use std::sync::Arc;

pub use client::FirestoreStore;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{insert_entity, to_fields, DocumentStore, Fields, Filter, StoredDocument};

/// Build the backend selected by `config.database_url`.
pub fn connect(config: &StoreConfig) -> StoreResult<Arc<dyn DocumentStore>> {
    if config.is_memory() {
        tracing::info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = FirestoreStore::connect(config)?;
    tracing::info!(base_url = %store.base_url(), "Using Firestore document store");
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_memory() {
        let store = connect(&StoreConfig::new("memory://", "clipper")).unwrap();
        assert_eq!(store.backend(), "memory");
    }
}
