//! Error types for the versioned configuration store.
//!
//! Mapped by a transport layer (out of scope for this crate) onto whatever
//! status codes it needs. `NotFound` is deliberately absent: the store
//! never returns it directly, callers map an empty `Option` to their own
//! not-found representation.

use crate::store::StoreError;

/// Errors returned by the versioned configuration store and its overlay.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed input: empty identity fields, malformed predicates, empty
    /// logical AND/OR, or an empty batch-read key set (a programming bug).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A conditional write could not proceed: either a create carried an
    /// upsert condition (creates never take one), or the condition did
    /// not match the stored document.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// Adapter I/O failure, encoding/decoding failure on write, or any
    /// other condition that is the store's fault rather than the caller's.
    #[error("internal error: {0}")]
    Internal(String),

    /// The underlying document store failed its health check.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Propagated from the document store adapter.
    #[error("document store error: {0}")]
    Store(#[from] StoreError),

    /// Propagated from (de)serializing a configuration payload.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::FailedPrecondition(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_context() {
        let err = ConfigError::failed_precondition("upsert condition did not match");
        assert_eq!(
            err.to_string(),
            "failed precondition: upsert condition did not match"
        );
    }

    #[test]
    fn json_errors_convert() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
