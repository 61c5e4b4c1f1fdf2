//! The change event sink: a fire-and-forget notification capability the
//! typed overlay invokes on create/update/delete.
//!
//! Event sink failures must never fail the user-visible operation that
//! triggered them — the overlay logs and swallows them.

use std::future::Future;

use serde_json::Value;

/// The kind of change that occurred to a typed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

/// A single change notification.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: EventKind,
    pub tenant_id: String,
    pub resource_name: String,
    pub id: String,
    pub prev: Option<Value>,
    pub curr: Option<Value>,
}

/// Errors a `ChangeEventSink` implementation can return. Never propagated
/// to the caller of an overlay operation — only logged.
#[derive(Debug, thiserror::Error)]
pub enum EventSinkError {
    #[error("event publish failed: {0}")]
    PublishFailed(String),
}

/// Fire-and-forget change notification capability consumed by the
/// identified object store overlay.
///
/// Ordering within a single `(tenant, id)` should be preserved with
/// respect to the calling thread; no cross-key ordering guarantee.
pub trait ChangeEventSink: Send + Sync {
    fn emit(
        &self,
        event: ChangeEvent,
    ) -> impl Future<Output = Result<(), EventSinkError>> + Send;
}

/// A sink that drops every event. Used when `publish.change.events` is
/// disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl ChangeEventSink for NoopEventSink {
    async fn emit(&self, _event: ChangeEvent) -> Result<(), EventSinkError> {
        Ok(())
    }
}

/// A sink that records every event it receives, for tests asserting event
/// fidelity.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: std::sync::Arc<std::sync::Mutex<Vec<ChangeEvent>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Clone for RecordingEventSink {
    /// Clones share the same underlying log, so a caller can keep a handle
    /// after moving a sink into an overlay and still inspect what it saw.
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

impl ChangeEventSink for RecordingEventSink {
    async fn emit(&self, event: ChangeEvent) -> Result<(), EventSinkError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_sink_always_succeeds() {
        let sink = NoopEventSink;
        let event = ChangeEvent {
            kind: EventKind::Created,
            tenant_id: "t".into(),
            resource_name: "r".into(),
            id: "x".into(),
            prev: None,
            curr: None,
        };
        sink.emit(event).await.unwrap();
    }

    #[tokio::test]
    async fn recording_sink_preserves_emission_order() {
        let sink = RecordingEventSink::new();
        for i in 0..3 {
            sink.emit(ChangeEvent {
                kind: EventKind::Updated,
                tenant_id: "t".into(),
                resource_name: "r".into(),
                id: i.to_string(),
                prev: None,
                curr: None,
            })
            .await
            .unwrap();
        }
        let ids: Vec<String> = sink.events().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }
}
