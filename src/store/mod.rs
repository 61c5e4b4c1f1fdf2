//! The document store adapter boundary: the narrow interface a concrete
//! backend (in-memory, or a real document database) must implement so the
//! versioned configuration store above it never has to know how documents
//! are actually persisted.
//!
//! Separates pure PUT/GET/DELETE storage (no business logic) from the
//! layer built on top of it: this adapter only knows about encoded
//! documents keyed by `DocumentKey`, never about tenants, preconditions,
//! or predicates beyond evaluating them.

pub mod errors;
pub mod in_memory;

pub use errors::StoreError;
pub use in_memory::InMemoryDocumentStore;

use std::future::Future;

use serde_json::Value;

use crate::document::key::DocumentKey;
use crate::filter::CompiledPredicate;

/// Sort direction for a `QuerySpec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A single-field sort instruction. Paths are document paths, e.g.
/// `"version"` or `"updateTimestamp"`.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub path: Vec<String>,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            path: path.into().split('.').map(str::to_string).collect(),
            direction,
        }
    }
}

/// A predicate-based query over the adapter's latest-version documents.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    pub predicate: Option<CompiledPredicate>,
    pub sort: Option<SortKeySpec>,
    pub limit: Option<usize>,
}

/// Owned form of `SortKey` stored on a `QuerySpec` (kept separate from the
/// builder-facing `SortKey` so `QuerySpec` can derive `Default`/`Clone`
/// without requiring callers to supply a sort).
#[derive(Debug, Clone)]
pub struct SortKeySpec {
    pub path: Vec<String>,
    pub direction: SortDirection,
}

impl From<SortKey> for SortKeySpec {
    fn from(key: SortKey) -> Self {
        Self {
            path: key.path,
            direction: key.direction,
        }
    }
}

impl QuerySpec {
    pub fn matching(predicate: CompiledPredicate) -> Self {
        Self {
            predicate: Some(predicate),
            sort: None,
            limit: None,
        }
    }

    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn limited_to(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A released, materialized result set from `DocumentStoreAdapter::query`.
///
/// Real document-store adapters typically back query results with a
/// server-side cursor or connection that must be explicitly closed to
/// avoid leaking resources on the remote side. `DocumentCursor` models
/// that lifetime even though the in-memory adapter has nothing to
/// release: callers are expected to call
/// `close()` when done, and a cursor dropped without an explicit close
/// logs a warning so the pattern is caught in adapters that do hold a
/// live resource.
pub struct DocumentCursor {
    items: Vec<Value>,
    position: usize,
    closed: bool,
}

impl DocumentCursor {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            position: 0,
            closed: false,
        }
    }

    /// Fetch the next document, or `None` once exhausted.
    pub fn next(&mut self) -> Option<Value> {
        let item = self.items.get(self.position).cloned();
        if item.is_some() {
            self.position += 1;
        }
        item
    }

    /// Remaining, un-consumed documents without advancing the cursor.
    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.position)
    }

    /// Drain all remaining documents and explicitly release the cursor.
    pub fn drain(mut self) -> Vec<Value> {
        let rest = self.items.split_off(self.position);
        self.close();
        rest
    }

    /// Explicitly release the cursor. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl Drop for DocumentCursor {
    fn drop(&mut self) {
        if !self.closed && self.remaining() > 0 {
            log::warn!(
                "DocumentCursor dropped with {} unread document(s) and no explicit close()",
                self.remaining()
            );
        }
    }
}

/// The narrow persistence boundary a concrete document store backend must
/// implement.
///
/// Implementations never see tenants, contexts, or upsert semantics —
/// those belong to the versioned configuration store built on top. An
/// adapter only needs to durably associate a `DocumentKey` with a
/// monotonic sequence of encoded document versions, and support querying
/// the latest version of each key by predicate.
pub trait DocumentStoreAdapter: Send + Sync {
    /// Append a new version for `key` and return the stored document.
    /// Adapters assign the version field themselves is NOT required: the
    /// caller (the versioned store) sets `version` on the encoded document
    /// before calling `upsert`, so the adapter only needs to persist it.
    fn upsert(
        &self,
        key: DocumentKey,
        document: Value,
    ) -> impl Future<Output = Result<Value, StoreError>> + Send;

    /// Replace the document at `key` only if the currently-stored document
    /// matches `predicate`. Returns the number of documents updated: `1` on
    /// a match, `0` if `key` has no current document or the current
    /// document doesn't satisfy `predicate`.
    fn update(
        &self,
        key: DocumentKey,
        document: Value,
        predicate: CompiledPredicate,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// All-or-nothing variant of `upsert` over multiple keys: either every
    /// document is written or none are. Returns whether the batch
    /// succeeded.
    fn bulk_upsert(
        &self,
        documents: Vec<(DocumentKey, Value)>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// The latest version stored for `key`, if any.
    fn get_latest(
        &self,
        key: &DocumentKey,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// A specific historical version for `key`, if it was ever stored.
    fn get_version(
        &self,
        key: &DocumentKey,
        version: u64,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// All retained versions for `key`, ordered by version descending.
    fn list_versions_desc(
        &self,
        key: &DocumentKey,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;

    /// Remove all versions stored for `key`. Returns `true` if anything was
    /// removed.
    fn delete(&self, key: &DocumentKey) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Remove every key whose latest document matches `predicate`.
    /// Returns the number of keys removed.
    fn delete_matching(
        &self,
        predicate: CompiledPredicate,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Query the latest version of every key against a predicate.
    fn query(
        &self,
        spec: QuerySpec,
    ) -> impl Future<Output = Result<DocumentCursor, StoreError>> + Send;

    /// Liveness probe used by `VersionedConfigStore::health_check`.
    fn health_check(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
