//! # Reconciler
//!
//! Core reconciliation logic for annotated `Secret` resources.
//!
//! The reconciler:
//! - Fetches the Secret through a [`SecretStore`]
//! - Runs the annotation-driven transforms on a local copy of its data
//! - Writes the Secret back only when the data actually changed
//! - Reports outcomes through an [`EventSink`]
//!
//! Retries, backoff and scheduling belong to the caller (see `crate::runtime`).

pub mod events;
pub mod reconcile;
pub mod store;
pub mod types;

pub use events::{EventSink, KubeEventSink, Severity};
pub use store::{KubeSecretStore, SecretStore, StoreError};
pub use types::{AppliedChange, PassOutcome, Reconciler, ReconcilerError};
