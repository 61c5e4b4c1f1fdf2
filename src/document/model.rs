//! The persisted configuration record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::key::{ConfigResource, ConfigResourceContext};
use crate::error::ConfigError;

/// A single version of a configuration document.
///
/// Field names are part of the external storage contract and must
/// round-trip losslessly through `to_value`/`from_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "resourceName")]
    pub resource_name: String,
    #[serde(rename = "resourceNamespace")]
    pub resource_namespace: String,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub context: String,
    pub version: u64,
    #[serde(rename = "lastUpdatedUserId")]
    pub last_updated_user_id: String,
    #[serde(rename = "lastUpdatedUserEmail")]
    pub last_updated_user_email: String,
    pub config: Value,
    #[serde(rename = "creationTimestamp")]
    pub creation_timestamp: i64,
    #[serde(rename = "updateTimestamp")]
    pub update_timestamp: i64,
}

/// Collection name configuration documents are logically stored under.
/// The in-memory adapter doesn't need this, but a real document-store
/// adapter binds its client to this name.
pub const COLLECTION_NAME: &str = "configurations";

impl ConfigDocument {
    pub fn resource_context(&self) -> ConfigResourceContext {
        ConfigResourceContext {
            resource: ConfigResource {
                tenant_id: self.tenant_id.clone(),
                resource_namespace: self.resource_namespace.clone(),
                resource_name: self.resource_name.clone(),
            },
            context: self.context.clone(),
        }
    }

    /// A `null` `config` value is treated as "absent".
    pub fn has_config(&self) -> bool {
        !self.config.is_null()
    }

    /// Encode to the self-describing structured form used for storage and
    /// for predicate evaluation (see `filter::eval`).
    pub fn to_value(&self) -> Result<Value, ConfigError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }
}
