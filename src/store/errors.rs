//! Errors surfaced by document store adapters, separate from the
//! versioned-store-level `ConfigError`.
//!
//! An adapter implementation only ever needs to report "I/O failed", "the
//! document is malformed", or "I'm unavailable" — the versioned store above
//! it is what understands preconditions, tenants, and predicates.

use thiserror::Error;

/// Errors a `DocumentStoreAdapter` implementation can return.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("adapter I/O failure: {0}")]
    Io(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("adapter unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
