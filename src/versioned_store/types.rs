//! Request/response types for `VersionedConfigStore`.

use serde_json::Value;

use crate::document::ConfigResourceContext;
use crate::filter::Predicate;

/// A single entry of a `writeConfig` request: the new payload and an
/// optional CAS-style precondition evaluated against the previous
/// document.
#[derive(Debug, Clone)]
pub struct WriteConfigRequest {
    pub config: Value,
    pub upsert_condition: Option<Predicate>,
}

impl WriteConfigRequest {
    pub fn new(config: Value) -> Self {
        Self {
            config,
            upsert_condition: None,
        }
    }

    pub fn with_condition(config: Value, upsert_condition: Predicate) -> Self {
        Self {
            config,
            upsert_condition: Some(upsert_condition),
        }
    }
}

/// One entry of a `writeAllConfigs` request. A plain `Vec` rather than a
/// map keeps the caller-supplied ordering explicit end to end: results are
/// returned in the same order the entries were submitted.
#[derive(Debug, Clone)]
pub struct WriteAllConfigsEntry {
    pub context: ConfigResourceContext,
    pub config: Value,
}

/// Result of a single successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertedConfig {
    pub config: Value,
    pub context: ConfigResourceContext,
    pub creation_timestamp: i64,
    pub update_timestamp: i64,
    /// Set iff a previous non-null config existed for this context.
    pub prev_config: Option<Value>,
}

/// A read result carrying the identity and timestamps alongside the
/// config payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSpecificConfig {
    pub context: ConfigResourceContext,
    pub config: Value,
    pub creation_timestamp: i64,
    pub update_timestamp: i64,
}
