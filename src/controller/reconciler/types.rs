//! # Types
//!
//! Core types for the reconciler.

use crate::controller::reconciler::events::{EventSink, REASON_COPIED_KEY, REASON_TRANSFORMED};
use crate::controller::reconciler::store::{SecretStore, StoreError};
use crate::transform::{DataWrite, TransformError, TransformSpec, Operation};
use std::sync::Arc;
use thiserror::Error;

/// Failures surfaced to the host for requeueing
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("failed to fetch secret {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("conflict while updating secret {key}: {source}")]
    Conflict {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to update secret {key}: {source}")]
    Update {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl ReconcilerError {
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReconcilerError::Conflict { .. })
    }
}

/// A write that made it into the persisted Secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedChange {
    Merged {
        destination: String,
    },
    Copied {
        source: &'static str,
        destination: String,
    },
}

impl AppliedChange {
    pub(crate) fn new(operation: &Operation, write: &DataWrite) -> Self {
        match operation.transform {
            TransformSpec::MergePem => AppliedChange::Merged {
                destination: write.key.clone(),
            },
            TransformSpec::CopyKey { source } => AppliedChange::Copied {
                source,
                destination: write.key.clone(),
            },
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            AppliedChange::Merged { .. } => REASON_TRANSFORMED,
            AppliedChange::Copied { .. } => REASON_COPIED_KEY,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            AppliedChange::Merged { destination } => format!("Added key {destination}"),
            AppliedChange::Copied {
                source,
                destination,
            } => format!("Copied the contents of {source:?} into key {destination:?}"),
        }
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        match self {
            AppliedChange::Merged { destination } | AppliedChange::Copied { destination, .. } => {
                destination
            }
        }
    }
}

/// How a pass ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The Secret no longer exists
    SecretGone,
    /// Nothing to write
    Unchanged,
    /// The Secret was written once with these changes
    Updated { changes: Vec<AppliedChange> },
    /// A copy source was missing; nothing was written
    Aborted {
        annotation: String,
        error: TransformError,
    },
}

/// Runs reconciliation passes against a store, reporting through an event sink.
///
/// Holds no per-object state: every pass works on its own copy of the Secret.
#[derive(Clone)]
pub struct Reconciler {
    pub store: Arc<dyn SecretStore>,
    pub events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }
}
