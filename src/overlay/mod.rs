//! Identified Object Store Overlay: a generic typed view over the
//! versioned configuration store.
//!
//! The overlay is a store value parameterized by a small capability
//! bundle: `encode`/`decode` between `T` and the opaque `config` payload,
//! `id_of` to derive identity, and a caller-supplied post-filter for
//! `get_all`. The overlay owns no state beyond that bundle and its
//! references to the versioned store and event sink.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::document::{ConfigResource, ConfigResourceContext};
use crate::error::ConfigError;
use crate::events::{ChangeEvent, ChangeEventSink, EventKind};
use crate::store::DocumentStoreAdapter;
use crate::versioned_store::{VersionedConfigStore, WriteAllConfigsEntry, WriteConfigRequest};

/// The capability bundle parameterizing an `IdentifiedObjectStore`: how to
/// turn a typed object into the opaque `config` payload and back, and how
/// to read its identity field.
///
/// `F` is the type of a caller-supplied post-filter evaluated by `get_all`;
/// use `()` when no filtering beyond "all latest, non-null" is needed.
pub trait ObjectCodec<T, F> {
    fn encode(&self, object: &T) -> Result<Value, ConfigError>;
    fn decode(&self, value: &Value) -> Result<T, ConfigError>;
    fn id_of(&self, object: &T) -> String;
    fn matches(&self, object: &T, filter: &F) -> bool;
}

/// A typed view over a `VersionedConfigStore`, scoped to a single
/// `(tenant, namespace, resource)` and parameterized by an `ObjectCodec`.
///
/// Identity is always `context = T.id`. Deserialization errors on read are
/// swallowed to `None` for that row so `get_all` stays resilient to
/// partially incompatible historical payloads; the overlay counts how many
/// rows were skipped this way via `deserialize_failures()`. Serialization
/// errors on write are fatal.
pub struct IdentifiedObjectStore<A, C, T, F, S = crate::events::NoopEventSink>
where
    A: DocumentStoreAdapter,
    C: ObjectCodec<T, F>,
    S: ChangeEventSink,
{
    store: VersionedConfigStore<A>,
    codec: C,
    resource: ConfigResource,
    sink: S,
    deserialize_failures: AtomicU64,
    _object: PhantomData<T>,
    _filter: PhantomData<F>,
}

impl<A, C, T, F, S> IdentifiedObjectStore<A, C, T, F, S>
where
    A: DocumentStoreAdapter,
    C: ObjectCodec<T, F>,
    S: ChangeEventSink,
{
    pub fn new(store: VersionedConfigStore<A>, codec: C, resource: ConfigResource, sink: S) -> Self {
        Self {
            store,
            codec,
            resource,
            sink,
            deserialize_failures: AtomicU64::new(0),
            _object: PhantomData,
            _filter: PhantomData,
        }
    }

    /// Count of rows silently dropped on read due to a deserialization
    /// failure.
    pub fn deserialize_failures(&self) -> u64 {
        self.deserialize_failures.load(Ordering::Relaxed)
    }

    fn context_for(&self, id: &str) -> Result<ConfigResourceContext, ConfigError> {
        self.resource.context(id.to_string())
    }

    /// Reads the current object (if any), writes the next version, and
    /// emits `CREATED` or `UPDATED` after successful persistence.
    ///
    /// Whether the event is `CREATED` or `UPDATED` is decided by whether a
    /// previous non-null document existed, not by whether it could be
    /// decoded into `T` — a previous document that fails to deserialize is
    /// still a real previous document, so the event is `UPDATED` with
    /// `prev: None` rather than a misreported `CREATED`.
    pub async fn upsert(&self, object: T) -> Result<T, ConfigError> {
        let id = self.codec.id_of(&object);
        let ctx = self.context_for(&id)?;
        let encoded = self.codec.encode(&object)?;

        let result = self
            .store
            .write_config(&ctx, "", "", WriteConfigRequest::new(encoded))
            .await?;

        let kind = if result.prev_config.is_some() {
            EventKind::Updated
        } else {
            EventKind::Created
        };
        let prev = result.prev_config.as_ref().and_then(|value| self.decode_for_event(value));
        self.emit_best_effort(ChangeEvent {
            kind,
            tenant_id: self.resource.tenant_id.clone(),
            resource_name: self.resource.resource_name.clone(),
            id,
            prev,
            curr: Some(result.config),
        })
        .await;

        Ok(object)
    }

    /// Bulk variant of `upsert`: events are emitted per element, in input
    /// order, only after the whole batch succeeds. Event kind is derived
    /// the same way as in `upsert` — independent of whether the previous
    /// document could be decoded.
    pub async fn upsert_all(&self, objects: Vec<T>) -> Result<Vec<T>, ConfigError> {
        let mut entries = Vec::with_capacity(objects.len());
        let mut ids = Vec::with_capacity(objects.len());
        for object in &objects {
            let id = self.codec.id_of(object);
            let ctx = self.context_for(&id)?;
            let encoded = self.codec.encode(object)?;
            ids.push(id.clone());
            entries.push(WriteAllConfigsEntry {
                context: ctx,
                config: encoded,
            });
        }

        let results = self.store.write_all_configs("", "", entries).await?;
        if results.is_empty() && !objects.is_empty() {
            // Bulk write rejected: emit nothing in this case.
            return Ok(Vec::new());
        }

        for (id, result) in ids.into_iter().zip(results.iter()) {
            let kind = if result.prev_config.is_some() {
                EventKind::Updated
            } else {
                EventKind::Created
            };
            let prev = result.prev_config.as_ref().and_then(|value| self.decode_for_event(value));
            self.emit_best_effort(ChangeEvent {
                kind,
                tenant_id: self.resource.tenant_id.clone(),
                resource_name: self.resource.resource_name.clone(),
                id,
                prev,
                curr: Some(result.config.clone()),
            })
            .await;
        }

        Ok(objects)
    }

    /// Latest object for `context = id`, `None` if absent or if
    /// deserialization fails.
    pub async fn get(&self, id: &str) -> Result<Option<T>, ConfigError> {
        let ctx = self.context_for(id)?;
        let Some(found) = self.store.get_config(&ctx).await? else {
            return Ok(None);
        };
        Ok(self.decode_for_read(&found.config))
    }

    /// Every latest-per-context object under this resource, deserialized
    /// and passed through `filter`.
    pub async fn get_all(&self, filter: &F) -> Result<Vec<T>, ConfigError> {
        let all = self.store.get_all_configs(&self.resource).await?;
        Ok(all
            .into_iter()
            .filter_map(|found| self.decode_for_read(&found.config))
            .filter(|object| self.codec.matches(object, filter))
            .collect())
    }

    /// Removes the object and emits `DELETED` with its previous value, if
    /// it existed.
    pub async fn delete(&self, id: &str) -> Result<(), ConfigError> {
        let ctx = self.context_for(id)?;
        let existing = self.store.get_config(&ctx).await?;
        self.store.delete_configs(std::slice::from_ref(&ctx)).await?;

        if let Some(found) = existing {
            self.emit_best_effort(ChangeEvent {
                kind: EventKind::Deleted,
                tenant_id: self.resource.tenant_id.clone(),
                resource_name: self.resource.resource_name.clone(),
                id: id.to_string(),
                prev: Some(found.config),
                curr: None,
            })
            .await;
        }
        Ok(())
    }

    /// Removes and emits `DELETED` for every object currently present
    /// under this resource.
    pub async fn delete_all(&self) -> Result<(), ConfigError> {
        let existing = self.store.get_all_configs(&self.resource).await?;
        if existing.is_empty() {
            return Ok(());
        }
        let ctxs: Vec<ConfigResourceContext> =
            existing.iter().map(|found| found.context.clone()).collect();
        self.store.delete_configs(&ctxs).await?;

        for found in existing {
            self.emit_best_effort(ChangeEvent {
                kind: EventKind::Deleted,
                tenant_id: self.resource.tenant_id.clone(),
                resource_name: self.resource.resource_name.clone(),
                id: found.context.context().to_string(),
                prev: Some(found.config),
                curr: None,
            })
            .await;
        }
        Ok(())
    }

    fn decode_for_read(&self, value: &Value) -> Option<T> {
        match self.codec.decode(value) {
            Ok(object) => Some(object),
            Err(err) => {
                self.deserialize_failures.fetch_add(1, Ordering::Relaxed);
                log::debug!("overlay: dropping row that failed to deserialize: {err}");
                None
            }
        }
    }

    fn decode_for_event(&self, value: &Value) -> Option<T> {
        self.decode_for_read(value)
    }

    async fn emit_best_effort(&self, event: ChangeEvent) {
        if let Err(err) = self.sink.emit(event).await {
            log::warn!("overlay: event sink failed, swallowing: {err}");
        }
    }
}
