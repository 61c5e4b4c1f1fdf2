//! Multi-tenant, versioned configuration store.
//!
//! Persists arbitrary structured configuration payloads keyed by
//! `(tenant, namespace, resource, context)`, maintains a monotonically
//! increasing version history per key, supports conditional
//! (compare-and-set-style) upserts over a small predicate language, bulk
//! upsert/read with stable ordering, and a generic typed overlay that
//! projects the latest version into an object store with change
//! notifications.
//!
//! The gRPC transport, tenant extraction from call context, a concrete
//! Mongo driver, and the event-bus publisher are host concerns and stay
//! out of scope for this crate (see `README.md`); it ships an in-memory
//! `DocumentStoreAdapter` suitable for tests and for small deployments
//! that don't need a real document database.
//!
//! # Layout
//!
//! - [`document`] — the persisted record and its identity types.
//! - [`filter`] — the public predicate grammar, its compiler, and evaluator.
//! - [`store`] — the `DocumentStoreAdapter` contract and an in-memory impl.
//! - [`versioned_store`] — [`versioned_store::VersionedConfigStore`], the
//!   orchestration layer.
//! - [`overlay`] — [`overlay::IdentifiedObjectStore`], the generic typed view.
//! - [`events`] — the change event sink contract.
//! - [`clock`] — injectable wall-clock capability.
//! - [`config`] — typed shapes for the service's recognized configuration keys.
//! - [`error`] — [`error::ConfigError`], the crate-wide error type.

pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod filter;
pub mod overlay;
pub mod store;
pub mod versioned_store;

pub use document::{ConfigDocument, ConfigResource, ConfigResourceContext, DocumentKey};
pub use error::ConfigError;
pub use events::{ChangeEvent, ChangeEventSink, EventKind};
pub use filter::{CompiledPredicate, Predicate, RelOp};
pub use overlay::{IdentifiedObjectStore, ObjectCodec};
pub use store::{DocumentStoreAdapter, InMemoryDocumentStore};
pub use versioned_store::{
    ContextSpecificConfig, UpsertedConfig, VersionedConfigStore, WriteAllConfigsEntry,
    WriteConfigRequest,
};
