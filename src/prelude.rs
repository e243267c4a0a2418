//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use secret_transform::prelude::*;
//! ```

// Transform engine
pub use crate::transform::{
    copy_key, merge_pem, resolve, should_reconcile, AnnotationKey, Annotations, DataWrite,
    Operation, ResolvedAnnotation, SecretData, TransformError, TransformSpec, OPERATIONS,
};

// Reconciler and its seams
pub use crate::controller::reconciler::{
    AppliedChange, EventSink, PassOutcome, Reconciler, ReconcilerError, SecretStore, Severity,
    StoreError,
};

// Config types
pub use crate::config::{ControllerConfig, LogFormat};
