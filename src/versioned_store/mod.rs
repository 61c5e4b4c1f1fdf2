//! The versioned configuration store: the heart of the crate. Orchestrates
//! the document model, the filter compiler, and a `DocumentStoreAdapter` to
//! provide read-latest, conditional write, bulk write, and history-aware
//! listing over `(tenant, namespace, resource, context)` keys.

pub mod types;

pub use types::{ContextSpecificConfig, UpsertedConfig, WriteAllConfigsEntry, WriteConfigRequest};

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::clock::Clock;
use crate::document::{ConfigDocument, ConfigResource, ConfigResourceContext};
use crate::error::ConfigError;
use crate::filter::{CompiledPredicate, compile_predicate};
use crate::store::{DocumentStoreAdapter, QuerySpec, SortDirection, SortKey};

/// Orchestrates a `DocumentStoreAdapter` into the versioned, multi-tenant
/// configuration store.
///
/// Holds only immutable references to its adapter and clock — no
/// in-process caching, every read hits the adapter.
pub struct VersionedConfigStore<A: DocumentStoreAdapter> {
    adapter: A,
    clock: Arc<dyn Clock>,
}

impl<A: DocumentStoreAdapter> VersionedConfigStore<A> {
    pub fn new(adapter: A, clock: Arc<dyn Clock>) -> Self {
        Self { adapter, clock }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Reads the current latest document, applies the create/update
    /// policy and version/timestamp rules, and writes the next version —
    /// conditionally via `upsertCondition` if supplied. A create (no prior
    /// document) may never carry a condition.
    pub async fn write_config(
        &self,
        ctx: &ConfigResourceContext,
        user_id: &str,
        user_email: &str,
        request: WriteConfigRequest,
    ) -> Result<UpsertedConfig, ConfigError> {
        let key = ctx.document_key();
        let previous_value = self.adapter.get_latest(&key).await?;
        let previous = previous_value.map(ConfigDocument::from_value).transpose()?;

        if previous.is_none() && request.upsert_condition.is_some() {
            return Err(ConfigError::failed_precondition(
                "No upsert condition required for creating config",
            ));
        }

        let now = self.clock.now_millis();
        let version = previous.as_ref().map(|d| d.version + 1).unwrap_or(1);
        let creation_timestamp = match &previous {
            Some(d) if d.has_config() => d.creation_timestamp,
            _ => now,
        };

        let new_doc = ConfigDocument {
            resource_name: ctx.resource_name().to_string(),
            resource_namespace: ctx.resource_namespace().to_string(),
            tenant_id: ctx.tenant_id().to_string(),
            context: ctx.context().to_string(),
            version,
            last_updated_user_id: user_id.to_string(),
            last_updated_user_email: user_email.to_string(),
            config: request.config.clone(),
            creation_timestamp,
            update_timestamp: now,
        };
        let encoded = new_doc.to_value()?;

        if let Some(condition) = &request.upsert_condition {
            let compiled = compile_predicate(condition)?;
            let updated = self.adapter.update(key, encoded, compiled).await?;
            if updated == 0 {
                return Err(ConfigError::failed_precondition(
                    "Update failed because upsert condition did not match given record",
                ));
            }
        } else {
            self.adapter.upsert(key, encoded).await?;
        }

        let prev_config = previous.filter(ConfigDocument::has_config).map(|d| d.config);
        Ok(UpsertedConfig {
            config: request.config,
            context: ctx.clone(),
            creation_timestamp,
            update_timestamp: now,
            prev_config,
        })
    }

    /// Reads every input key's latest document in one batch, builds the
    /// next version for each, then writes them all-or-nothing via
    /// `bulkUpsert`. Returns the empty list on bulk failure rather than an
    /// error.
    pub async fn write_all_configs(
        &self,
        user_id: &str,
        user_email: &str,
        entries: Vec<WriteAllConfigsEntry>,
    ) -> Result<Vec<UpsertedConfig>, ConfigError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let ctxs: Vec<ConfigResourceContext> = entries.iter().map(|e| e.context.clone()).collect();
        let previous = self.batch_read_latest(&ctxs).await?;
        let now = self.clock.now_millis();

        let mut pending = Vec::with_capacity(entries.len());
        let mut results = Vec::with_capacity(entries.len());
        for entry in &entries {
            let prev_doc = previous.get(&entry.context);
            let version = prev_doc.map(|d| d.version + 1).unwrap_or(1);
            let creation_timestamp = match prev_doc {
                Some(d) if d.has_config() => d.creation_timestamp,
                _ => now,
            };
            let new_doc = ConfigDocument {
                resource_name: entry.context.resource_name().to_string(),
                resource_namespace: entry.context.resource_namespace().to_string(),
                tenant_id: entry.context.tenant_id().to_string(),
                context: entry.context.context().to_string(),
                version,
                last_updated_user_id: user_id.to_string(),
                last_updated_user_email: user_email.to_string(),
                config: entry.config.clone(),
                creation_timestamp,
                update_timestamp: now,
            };
            let prev_config = prev_doc
                .filter(|d| d.has_config())
                .map(|d| d.config.clone());
            pending.push((entry.context.document_key(), new_doc.to_value()?));
            results.push(UpsertedConfig {
                config: entry.config.clone(),
                context: entry.context.clone(),
                creation_timestamp,
                update_timestamp: now,
                prev_config,
            });
        }

        let success = self.adapter.bulk_upsert(pending).await?;
        if !success {
            return Ok(Vec::new());
        }
        Ok(results)
    }

    /// Latest version for `ctx`, `None` if absent or `config` is null.
    pub async fn get_config(
        &self,
        ctx: &ConfigResourceContext,
    ) -> Result<Option<ContextSpecificConfig>, ConfigError> {
        let key = ctx.document_key();
        let Some(value) = self.adapter.get_latest(&key).await? else {
            return Ok(None);
        };
        let doc = ConfigDocument::from_value(value)?;
        if !doc.has_config() {
            return Ok(None);
        }
        Ok(Some(to_context_specific(doc)))
    }

    /// Batched `getConfig`. Keys with no latest non-null config are
    /// omitted from the result map.
    pub async fn get_context_configs(
        &self,
        ctxs: &[ConfigResourceContext],
    ) -> Result<HashMap<ConfigResourceContext, ContextSpecificConfig>, ConfigError> {
        let docs = self.batch_read_latest(ctxs).await?;
        Ok(docs
            .into_iter()
            .filter(|(_, doc)| doc.has_config())
            .map(|(ctx, doc)| (ctx, to_context_specific(doc)))
            .collect())
    }

    /// Every distinct context's highest-version, non-null config under
    /// `resource`, sorted by `creationTimestamp` descending with ties
    /// broken by first appearance in the version-descending stream.
    pub async fn get_all_configs(
        &self,
        resource: &ConfigResource,
    ) -> Result<Vec<ContextSpecificConfig>, ConfigError> {
        let predicate = CompiledPredicate::and(vec![
            CompiledPredicate::field_eq("tenantId", json!(resource.tenant_id)),
            CompiledPredicate::field_eq("resourceNamespace", json!(resource.resource_namespace)),
            CompiledPredicate::field_eq("resourceName", json!(resource.resource_name)),
        ]);
        let spec =
            QuerySpec::matching(predicate).sorted_by(SortKey::new("version", SortDirection::Desc));
        let mut cursor = self.adapter.query(spec).await?;

        let mut seen_contexts = std::collections::HashSet::new();
        let mut latest_per_context = Vec::new();
        while let Some(value) = cursor.next() {
            let doc = ConfigDocument::from_value(value)?;
            if seen_contexts.insert(doc.context.clone()) {
                latest_per_context.push(doc);
            }
        }
        cursor.close();

        latest_per_context.retain(ConfigDocument::has_config);
        // `sort_by_key` is stable, so equal creation timestamps keep their
        // relative order from the version-descending stream.
        latest_per_context.sort_by_key(|doc| std::cmp::Reverse(doc.creation_timestamp));

        Ok(latest_per_context.into_iter().map(to_context_specific).collect())
    }

    /// No-op on empty input, otherwise removes every document matching
    /// any of `ctxs`.
    pub async fn delete_configs(&self, ctxs: &[ConfigResourceContext]) -> Result<(), ConfigError> {
        if ctxs.is_empty() {
            return Ok(());
        }
        let predicate = build_context_set_predicate(ctxs)?;
        self.adapter.delete_matching(predicate).await?;
        Ok(())
    }

    /// Delegates to the adapter's liveness probe.
    pub async fn health_check(&self) -> bool {
        self.adapter.health_check().await.is_ok()
    }

    /// Fetch the latest document for every key in `ctxs` in a single
    /// predicate query. All inputs must share one `tenantId`; mixed
    /// tenants are a programming error (`Internal`).
    async fn batch_read_latest(
        &self,
        ctxs: &[ConfigResourceContext],
    ) -> Result<HashMap<ConfigResourceContext, ConfigDocument>, ConfigError> {
        let predicate = build_context_set_predicate(ctxs)?;
        let spec = QuerySpec::matching(predicate).limited_to(ctxs.len());
        let mut cursor = self.adapter.query(spec).await?;

        let mut result = HashMap::new();
        while let Some(value) = cursor.next() {
            let doc = ConfigDocument::from_value(value)?;
            result.insert(doc.resource_context(), doc);
        }
        cursor.close();
        Ok(result)
    }
}

fn to_context_specific(doc: ConfigDocument) -> ContextSpecificConfig {
    ContextSpecificConfig {
        context: doc.resource_context(),
        config: doc.config,
        creation_timestamp: doc.creation_timestamp,
        update_timestamp: doc.update_timestamp,
    }
}

/// Build `tenantId == T AND OR_over_ctxs(resource==R_i AND namespace==N_i
/// AND context==C_i)`. Empty input is a programming bug
/// (`InvalidArgument`); callers that treat empty input as a no-op
/// (`deleteConfigs`) must check before calling this.
fn build_context_set_predicate(
    ctxs: &[ConfigResourceContext],
) -> Result<CompiledPredicate, ConfigError> {
    let Some(first) = ctxs.first() else {
        return Err(ConfigError::invalid_argument(
            "buildConfigResourceContextsFilter requires at least one context",
        ));
    };
    let tenant_id = &first.resource.tenant_id;
    if ctxs.iter().any(|c| &c.resource.tenant_id != tenant_id) {
        return Err(ConfigError::internal(
            "mixed-tenant input to batch read is a programming error",
        ));
    }

    let mut per_ctx: Vec<CompiledPredicate> = ctxs
        .iter()
        .map(|c| {
            CompiledPredicate::and(vec![
                CompiledPredicate::field_eq("resourceName", json!(c.resource.resource_name)),
                CompiledPredicate::field_eq(
                    "resourceNamespace",
                    json!(c.resource.resource_namespace),
                ),
                CompiledPredicate::field_eq("context", json!(c.context)),
            ])
        })
        .collect();
    let ctx_filter = if per_ctx.len() == 1 {
        per_ctx.remove(0)
    } else {
        CompiledPredicate::or(per_ctx)
    };

    Ok(CompiledPredicate::and(vec![
        CompiledPredicate::field_eq("tenantId", json!(tenant_id.clone())),
        ctx_filter,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::filter::{Predicate, RelOp};
    use crate::store::InMemoryDocumentStore;
    use serde_json::{Value, json};

    fn store(clock: Arc<FixedClock>) -> VersionedConfigStore<InMemoryDocumentStore> {
        VersionedConfigStore::new(InMemoryDocumentStore::new(), clock)
    }

    fn ctx(resource: &str, context: &str) -> ConfigResourceContext {
        ConfigResource::new("tenant-a", "labels", resource)
            .unwrap()
            .context(context)
            .unwrap()
    }

    #[tokio::test]
    async fn single_key_lifecycle_preserves_creation_timestamp() {
        let clock = Arc::new(FixedClock::new(1_000));
        let vs = store(clock.clone());
        let c = ctx("rule", "");

        let v1 = vs
            .write_config(&c, "u1", "u1@example.com", WriteConfigRequest::new(json!({"a": 1})))
            .await
            .unwrap();
        assert_eq!(v1.creation_timestamp, 1_000);
        assert_eq!(v1.update_timestamp, 1_000);
        assert!(v1.prev_config.is_none());

        clock.advance(500);
        let v2 = vs
            .write_config(&c, "u1", "u1@example.com", WriteConfigRequest::new(json!({"a": 2})))
            .await
            .unwrap();
        assert_eq!(v2.creation_timestamp, 1_000);
        assert_eq!(v2.update_timestamp, 1_500);
        assert_eq!(v2.prev_config, Some(json!({"a": 1})));

        let read = vs.get_config(&c).await.unwrap().unwrap();
        assert_eq!(read.config, json!({"a": 2}));
        assert_eq!(read.creation_timestamp, 1_000);
        assert_eq!(read.update_timestamp, 1_500);
    }

    #[tokio::test]
    async fn conditional_upsert_succeeds_then_fails_on_stale_condition() {
        let clock = Arc::new(FixedClock::new(0));
        let vs = store(clock);
        let c = ctx("rule", "");
        vs.write_config(&c, "u", "u@x", WriteConfigRequest::new(json!({"a": 1})))
            .await
            .unwrap();
        vs.write_config(&c, "u", "u@x", WriteConfigRequest::new(json!({"a": 2})))
            .await
            .unwrap();

        let cond_match = Predicate::Relational {
            lhs: "a".into(),
            op: RelOp::Eq,
            rhs: json!(2),
        };
        let ok = vs
            .write_config(
                &c,
                "u",
                "u@x",
                WriteConfigRequest::with_condition(json!({"a": 3}), cond_match),
            )
            .await
            .unwrap();
        assert_eq!(ok.config, json!({"a": 3}));

        let cond_stale = Predicate::Relational {
            lhs: "a".into(),
            op: RelOp::Eq,
            rhs: json!(2),
        };
        let err = vs
            .write_config(
                &c,
                "u",
                "u@x",
                WriteConfigRequest::with_condition(json!({"a": 4}), cond_stale),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::FailedPrecondition(_)));

        let still = vs.get_config(&c).await.unwrap().unwrap();
        assert_eq!(still.config, json!({"a": 3}));
    }

    #[tokio::test]
    async fn create_with_condition_is_rejected() {
        let clock = Arc::new(FixedClock::new(0));
        let vs = store(clock);
        let c = ctx("rule", "");
        let condition = Predicate::Relational {
            lhs: "a".into(),
            op: RelOp::Eq,
            rhs: json!(1),
        };
        let err = vs
            .write_config(
                &c,
                "u",
                "u@x",
                WriteConfigRequest::with_condition(json!({"a": 1}), condition),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::FailedPrecondition(msg) if msg.contains("No upsert condition")));
    }

    #[tokio::test]
    async fn get_all_configs_orders_by_creation_timestamp_descending() {
        let clock = Arc::new(FixedClock::new(100));
        let vs = store(clock.clone());
        let resource = ConfigResource::new("tenant-a", "labels", "rule").unwrap();

        vs.write_config(
            &resource.context("A").unwrap(),
            "u",
            "u@x",
            WriteConfigRequest::new(json!({"v": "a1"})),
        )
        .await
        .unwrap();

        clock.advance(10);
        vs.write_config(
            &resource.context("B").unwrap(),
            "u",
            "u@x",
            WriteConfigRequest::new(json!({"v": "b1"})),
        )
        .await
        .unwrap();

        clock.advance(10);
        vs.write_config(
            &resource.context("A").unwrap(),
            "u",
            "u@x",
            WriteConfigRequest::new(json!({"v": "a2"})),
        )
        .await
        .unwrap();

        let all = vs.get_all_configs(&resource).await.unwrap();
        let contexts: Vec<&str> = all.iter().map(|c| c.context.context()).collect();
        assert_eq!(contexts, vec!["B", "A"]);
        assert_eq!(all[1].config, json!({"v": "a2"}));
    }

    #[tokio::test]
    async fn bulk_write_preserves_input_order_and_versions_each_entry() {
        let clock = Arc::new(FixedClock::new(0));
        let vs = store(clock);
        let resource = ConfigResource::new("tenant-a", "labels", "rule").unwrap();
        vs.write_config(
            &resource.context("A").unwrap(),
            "u",
            "u@x",
            WriteConfigRequest::new(json!({"v": 1})),
        )
        .await
        .unwrap();

        let entries = vec![
            WriteAllConfigsEntry {
                context: resource.context("C").unwrap(),
                config: json!({"v": 1}),
            },
            WriteAllConfigsEntry {
                context: resource.context("A").unwrap(),
                config: json!({"v": 2}),
            },
            WriteAllConfigsEntry {
                context: resource.context("B").unwrap(),
                config: json!({"v": 1}),
            },
        ];
        let results = vs.write_all_configs("u", "u@x", entries).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].context.context(), "C");
        assert_eq!(results[1].context.context(), "A");
        assert_eq!(results[2].context.context(), "B");

        let a = vs.get_config(&resource.context("A").unwrap()).await.unwrap().unwrap();
        assert_eq!(a.config, json!({"v": 2}));
    }

    #[tokio::test]
    async fn delete_then_recreate_resets_version_to_one() {
        let clock = Arc::new(FixedClock::new(0));
        let vs = store(clock);
        let c = ctx("rule", "x");
        vs.write_config(&c, "u", "u@x", WriteConfigRequest::new(json!({"a": 1})))
            .await
            .unwrap();

        vs.delete_configs(&[c.clone()]).await.unwrap();
        assert!(vs.get_config(&c).await.unwrap().is_none());

        let recreated = vs
            .write_config(&c, "u", "u@x", WriteConfigRequest::new(json!({"a": 99})))
            .await
            .unwrap();
        assert!(recreated.prev_config.is_none());
        let key = c.document_key();
        let stored = vs.adapter().get_latest(&key).await.unwrap().unwrap();
        assert_eq!(stored["version"], 1);
    }

    #[tokio::test]
    async fn delete_configs_is_noop_on_empty_input() {
        let clock = Arc::new(FixedClock::new(0));
        let vs = store(clock);
        vs.delete_configs(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn get_context_configs_omits_absent_and_null_entries() {
        let clock = Arc::new(FixedClock::new(0));
        let vs = store(clock);
        let resource = ConfigResource::new("tenant-a", "labels", "rule").unwrap();
        let a = resource.context("A").unwrap();
        let b = resource.context("B").unwrap();
        let missing = resource.context("missing").unwrap();

        vs.write_config(&a, "u", "u@x", WriteConfigRequest::new(json!({"v": 1})))
            .await
            .unwrap();
        vs.write_config(&b, "u", "u@x", WriteConfigRequest::new(Value::Null))
            .await
            .unwrap();

        let results = vs
            .get_context_configs(&[a.clone(), b.clone(), missing])
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.contains_key(&a));
    }

    #[tokio::test]
    async fn get_context_configs_rejects_mixed_tenant_input() {
        let clock = Arc::new(FixedClock::new(0));
        let vs = store(clock);
        let a = ConfigResource::new("tenant-a", "labels", "rule")
            .unwrap()
            .context("x")
            .unwrap();
        let b = ConfigResource::new("tenant-b", "labels", "rule")
            .unwrap()
            .context("x")
            .unwrap();
        let err = vs.get_context_configs(&[a, b]).await.unwrap_err();
        assert!(matches!(err, ConfigError::Internal(_)));
    }
}
