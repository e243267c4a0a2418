//! secret-transform Controller Library
//!
//! Derives secondary data keys inside Kubernetes Secrets from keys already
//! present, driven by annotations on the Secret.
//!
//! - [`transform`]: annotation resolution, the trigger filter and the transforms
//! - [`controller`]: the reconciler and its store/event seams, backoff and probe server
//! - [`runtime`]: kube-runtime wiring (bootstrap, watch loop, error policy)
//! - [`config`], [`observability`], [`constants`]: ambient plumbing

pub mod config;
pub mod constants;
pub mod controller;
pub mod observability;
pub mod prelude;
pub mod runtime;
pub mod transform;
