//! Shared helpers for the integration test suite.

use std::sync::Arc;

use config_store::clock::FixedClock;
use config_store::document::ConfigResource;
use config_store::store::InMemoryDocumentStore;
use config_store::versioned_store::VersionedConfigStore;

pub fn fresh_store(start_millis: i64) -> (VersionedConfigStore<InMemoryDocumentStore>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(start_millis));
    let store = VersionedConfigStore::new(InMemoryDocumentStore::new(), clock.clone());
    (store, clock)
}

pub fn resource(name: &str) -> ConfigResource {
    ConfigResource::new("tenant-a", "labels", name).expect("valid resource identity")
}
