//! # Transform
//!
//! Annotation-driven derivation of extra data keys inside a Secret.
//!
//! - `annotations`: annotation key table lookup and the trigger filter
//! - `operations`: the ordered table of supported operations
//! - `engine`: the `tls.pem` merge and key copy transforms

pub mod annotations;
pub mod engine;
pub mod operations;

pub use annotations::{resolve, should_reconcile, AnnotationKey, Annotations, ResolvedAnnotation};
pub use engine::{copy_key, merge_pem, DataWrite, SecretData, TransformError};
pub use operations::{Operation, TransformSpec, OPERATIONS};
