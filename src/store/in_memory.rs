//! In-memory `DocumentStoreAdapter` implementation.
//!
//! A single `RwLock`-guarded map, with values held as `serde_json::Value`
//! rather than a typed resource. Unlike a latest-value-only cache, this
//! adapter retains the full per-key version history, since the versioned
//! store above it needs to walk history to return every distinct context's
//! latest document and to support reading a specific historical version.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::document::key::DocumentKey;
use crate::filter::eval;
use crate::store::{DocumentCursor, DocumentStoreAdapter, QuerySpec, SortDirection, StoreError};

/// An in-memory, process-local `DocumentStoreAdapter`.
///
/// Each key maps to its full version history, oldest first. `upsert`
/// appends; it never mutates or removes an earlier entry, so concurrent
/// readers holding a cloned `Value` from an earlier version are never
/// affected by a later write.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn version_of(document: &Value) -> u64 {
        document
            .get("version")
            .and_then(Value::as_u64)
            .unwrap_or_default()
    }

    fn resolve_sort_path<'a>(document: &'a Value, path: &[String]) -> Option<&'a Value> {
        let mut current = document;
        for segment in path {
            current = current.get(segment)?;
        }
        Some(current)
    }
}

impl DocumentStoreAdapter for InMemoryDocumentStore {
    async fn upsert(&self, key: DocumentKey, document: Value) -> Result<Value, StoreError> {
        let mut guard = self.documents.write().await;
        guard
            .entry(key.as_str().to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        key: DocumentKey,
        document: Value,
        predicate: crate::filter::CompiledPredicate,
    ) -> Result<u64, StoreError> {
        let mut guard = self.documents.write().await;
        let history = guard.entry(key.as_str().to_string()).or_default();
        let matches = history.last().is_some_and(|current| eval(&predicate, current));
        if !matches {
            return Ok(0);
        }
        history.push(document);
        Ok(1)
    }

    async fn bulk_upsert(&self, documents: Vec<(DocumentKey, Value)>) -> Result<bool, StoreError> {
        // A real document-store adapter would wrap this in a transaction;
        // the in-memory adapter already holds the write lock for the
        // whole batch, so there is no partial-application window to guard.
        let mut guard = self.documents.write().await;
        for (key, document) in documents {
            guard.entry(key.as_str().to_string()).or_default().push(document);
        }
        Ok(true)
    }

    async fn get_latest(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError> {
        let guard = self.documents.read().await;
        Ok(guard
            .get(key.as_str())
            .and_then(|history| history.last())
            .cloned())
    }

    async fn get_version(
        &self,
        key: &DocumentKey,
        version: u64,
    ) -> Result<Option<Value>, StoreError> {
        let guard = self.documents.read().await;
        Ok(guard.get(key.as_str()).and_then(|history| {
            history
                .iter()
                .find(|document| Self::version_of(document) == version)
                .cloned()
        }))
    }

    async fn list_versions_desc(&self, key: &DocumentKey) -> Result<Vec<Value>, StoreError> {
        let guard = self.documents.read().await;
        let mut history = guard.get(key.as_str()).cloned().unwrap_or_default();
        history.sort_by_key(|document| std::cmp::Reverse(Self::version_of(document)));
        Ok(history)
    }

    async fn delete(&self, key: &DocumentKey) -> Result<bool, StoreError> {
        let mut guard = self.documents.write().await;
        Ok(guard.remove(key.as_str()).is_some())
    }

    async fn delete_matching(
        &self,
        predicate: crate::filter::CompiledPredicate,
    ) -> Result<u64, StoreError> {
        let mut guard = self.documents.write().await;
        let matching_keys: Vec<String> = guard
            .iter()
            .filter(|(_, history)| {
                history
                    .last()
                    .is_some_and(|document| eval(&predicate, document))
            })
            .map(|(key, _)| key.clone())
            .collect();
        let count = matching_keys.len() as u64;
        for key in matching_keys {
            guard.remove(&key);
        }
        Ok(count)
    }

    async fn query(&self, spec: QuerySpec) -> Result<DocumentCursor, StoreError> {
        let guard = self.documents.read().await;
        let mut matches: Vec<Value> = guard
            .values()
            .filter_map(|history| history.last())
            .filter(|document| match &spec.predicate {
                Some(predicate) => eval(predicate, document),
                None => true,
            })
            .cloned()
            .collect();

        if let Some(sort) = &spec.sort {
            matches.sort_by(|a, b| {
                let ordering = match (
                    Self::resolve_sort_path(a, &sort.path),
                    Self::resolve_sort_path(b, &sort.path),
                ) {
                    (Some(a), Some(b)) => {
                        if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
                            a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
                        } else {
                            a.to_string().cmp(&b.to_string())
                        }
                    }
                    (Some(_), None) => std::cmp::Ordering::Greater,
                    (None, Some(_)) => std::cmp::Ordering::Less,
                    (None, None) => std::cmp::Ordering::Equal,
                };
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = spec.limit {
            matches.truncate(limit);
        }

        Ok(DocumentCursor::new(matches))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let _ = self.documents.read().await;
        Ok(())
    }
}
