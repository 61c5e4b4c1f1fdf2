//! Typed service configuration shapes.
//!
//! Loading these from a file or environment is transport/host wiring and
//! stays out of scope here — this module only defines and validates the
//! typed shape a host binary would deserialize into, following a
//! builder-struct-plus-`validate()` pattern.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// `document.store.dataStoreType`. Only `Mongo` has a concrete driver in
/// the host binary; the variant set is otherwise open for future backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataStoreType {
    Mongo,
}

/// One `document.store.mongo.endpoints[]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongoEndpoint {
    pub host: String,
    pub port: u16,
}

/// `document.store.mongo.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongoConfig {
    pub database: String,
    pub user: String,
    pub password: String,
    pub endpoints: Vec<MongoEndpoint>,
}

impl MongoConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.is_empty() {
            return Err(ConfigError::invalid_argument(
                "document.store.mongo.database must not be empty",
            ));
        }
        if self.endpoints.is_empty() {
            return Err(ConfigError::invalid_argument(
                "document.store.mongo.endpoints must have at least one entry",
            ));
        }
        Ok(())
    }
}

/// `document.store.*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStoreConfig {
    #[serde(rename = "dataStoreType")]
    pub data_store_type: DataStoreType,
    #[serde(rename = "maxPoolSize")]
    pub max_pool_size: u32,
    pub mongo: MongoConfig,
}

impl DocumentStoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pool_size == 0 {
            return Err(ConfigError::invalid_argument(
                "document.store.maxPoolSize must be positive",
            ));
        }
        self.mongo.validate()
    }
}

/// `service.port` / `service.admin.port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePorts {
    pub port: u16,
    #[serde(rename = "adminPort")]
    pub admin_port: u16,
}

impl Default for ServicePorts {
    fn default() -> Self {
        Self {
            port: 8080,
            admin_port: 8081,
        }
    }
}

/// The full set of recognized configuration keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub service: ServicePorts,
    #[serde(rename = "documentStore")]
    pub document_store: DocumentStoreConfig,
    #[serde(rename = "publishChangeEvents", default)]
    pub publish_change_events: bool,
}

impl ServiceConfig {
    /// Validate field-level invariants not enforced by deserialization
    /// alone (positive pool size, non-empty Mongo identity). Does not
    /// attempt I/O or connectivity checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.document_store.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ServiceConfig {
        ServiceConfig {
            service: ServicePorts::default(),
            document_store: DocumentStoreConfig {
                data_store_type: DataStoreType::Mongo,
                max_pool_size: 10,
                mongo: MongoConfig {
                    database: "configs".into(),
                    user: "svc".into(),
                    password: "secret".into(),
                    endpoints: vec![MongoEndpoint {
                        host: "localhost".into(),
                        port: 27017,
                    }],
                },
            },
            publish_change_events: true,
        }
    }

    #[test]
    fn valid_config_passes() {
        sample().validate().unwrap();
    }

    #[test]
    fn rejects_zero_pool_size() {
        let mut cfg = sample();
        cfg.document_store.max_pool_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_mongo_endpoints() {
        let mut cfg = sample();
        cfg.document_store.mongo.endpoints.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn deserializes_from_json() {
        let json = serde_json::json!({
            "documentStore": {
                "dataStoreType": "mongo",
                "maxPoolSize": 5,
                "mongo": {
                    "database": "configs",
                    "user": "svc",
                    "password": "secret",
                    "endpoints": [{"host": "localhost", "port": 27017}]
                }
            },
            "publishChangeEvents": false
        });
        let cfg: ServiceConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.service.port, 8080);
        assert!(!cfg.publish_change_events);
        cfg.validate().unwrap();
    }
}
