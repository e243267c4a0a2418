//! # Events
//!
//! Human-readable status records attached to the Secret.

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Client, Resource};
use kube_runtime::events::{Event, EventType, Recorder, Reporter};

pub const REASON_TRANSFORMED: &str = "Transformed";
pub const REASON_COPIED_KEY: &str = "CopiedKey";

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "Normal",
            Severity::Warning => "Warning",
        }
    }
}

impl From<Severity> for EventType {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Normal => EventType::Normal,
            Severity::Warning => EventType::Warning,
        }
    }
}

/// Destination for reconciliation events
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emit one event about `secret`
    async fn emit(
        &self,
        secret: &Secret,
        severity: Severity,
        reason: &str,
        message: &str,
    ) -> Result<()>;
}

/// [`EventSink`] publishing Kubernetes Events
pub struct KubeEventSink {
    recorder: Recorder,
}

impl std::fmt::Debug for KubeEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeEventSink").finish_non_exhaustive()
    }
}

impl KubeEventSink {
    #[must_use]
    pub fn new(client: Client, reporter: Reporter) -> Self {
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventSink for KubeEventSink {
    async fn emit(
        &self,
        secret: &Secret,
        severity: Severity,
        reason: &str,
        message: &str,
    ) -> Result<()> {
        let event = Event {
            type_: severity.into(),
            reason: reason.to_string(),
            note: Some(message.to_string()),
            action: "Reconcile".to_string(),
            secondary: None,
        };
        self.recorder
            .publish(&event, &secret.object_ref(&()))
            .await
            .with_context(|| format!("Failed to publish {reason} event"))
    }
}
