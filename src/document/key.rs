//! Identity types for configuration documents.
//!
//! `ConfigResource` and `ConfigResourceContext` are the public identity
//! tuples clients address a configuration by; `DocumentKey` is the
//! adapter-facing, deterministically encoded key used for keyed
//! upsert/update.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::ConfigError;

/// Identifies a logical configuration family: `(tenantId, namespace, resource)`.
///
/// Equality is structural; all three fields must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigResource {
    pub tenant_id: String,
    pub resource_namespace: String,
    pub resource_name: String,
}

impl ConfigResource {
    pub fn new(
        tenant_id: impl Into<String>,
        resource_namespace: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let resource = Self {
            tenant_id: tenant_id.into(),
            resource_namespace: resource_namespace.into(),
            resource_name: resource_name.into(),
        };
        resource.validate()?;
        Ok(resource)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tenant_id.is_empty() {
            return Err(ConfigError::invalid_argument("tenantId must not be empty"));
        }
        if self.resource_namespace.is_empty() {
            return Err(ConfigError::invalid_argument(
                "resourceNamespace must not be empty",
            ));
        }
        if self.resource_name.is_empty() {
            return Err(ConfigError::invalid_argument(
                "resourceName must not be empty",
            ));
        }
        Ok(())
    }

    /// Build a context-specific identity under this resource.
    pub fn context(&self, context: impl Into<String>) -> Result<ConfigResourceContext, ConfigError> {
        ConfigResourceContext::new(self.clone(), context)
    }
}

/// `ConfigResource` plus a `context` distinguishing sibling configurations
/// under the same resource. The empty context denotes a singleton
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigResourceContext {
    pub resource: ConfigResource,
    pub context: String,
}

impl ConfigResourceContext {
    pub fn new(resource: ConfigResource, context: impl Into<String>) -> Result<Self, ConfigError> {
        let context = context.into();
        Ok(Self { resource, context })
    }

    pub fn tenant_id(&self) -> &str {
        &self.resource.tenant_id
    }

    pub fn resource_namespace(&self) -> &str {
        &self.resource.resource_namespace
    }

    pub fn resource_name(&self) -> &str {
        &self.resource.resource_name
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Derive the deterministic, opaque storage key for this identity.
    pub fn document_key(&self) -> DocumentKey {
        DocumentKey::new(self)
    }
}

impl fmt::Display for ConfigResourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.resource.tenant_id,
            self.resource.resource_namespace,
            self.resource.resource_name,
            self.context
        )
    }
}

/// A deterministic, opaque encoding of `(tenantId, namespace, resource,
/// context)` used as the keyed-upsert identity.
///
/// The encoding is a SHA-256 digest of the delimited identity tuple,
/// base64-encoded — stable across process restarts and opaque to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    encoded: String,
}

impl DocumentKey {
    pub fn new(ctx: &ConfigResourceContext) -> Self {
        // \u{1f} (unit separator) can't appear in the inputs via normal
        // config-store usage and keeps components from colliding across
        // concatenation boundaries.
        let raw = format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}",
            ctx.resource.tenant_id,
            ctx.resource.resource_namespace,
            ctx.resource.resource_name,
            ctx.context
        );
        let mut hasher = Sha256::new();
        hasher.update(raw.as_bytes());
        let hash = hasher.finalize();
        let encoded = BASE64.encode(hash);
        Self { encoded }
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encoded)
    }
}
