//! # Error Policy
//!
//! Decides when a Secret whose pass failed is reconciled again.
//! Conflicts are retried almost immediately with fresh state; every other
//! failure backs off per Secret along a Fibonacci sequence.

use crate::controller::reconciler::ReconcilerError;
use crate::observability::metrics;
use crate::runtime::context::ControllerContext;
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::{error, info};

pub fn handle_reconciliation_error(
    secret: Arc<Secret>,
    error: &ReconcilerError,
    ctx: Arc<ControllerContext>,
) -> Action {
    let name = secret.name_any();
    let namespace = secret.namespace().unwrap_or_else(|| "default".to_string());

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = name.as_str(),
        resource.namespace = namespace.as_str(),
        error = %error
    );
    let _error_guard = error_span.enter();

    metrics::increment_reconciliation_errors();

    if error.is_conflict() {
        let delay = ctx.config.conflict_requeue_duration();
        info!(
            "Secret {}/{} changed underneath us, retrying in {}s",
            namespace,
            name,
            delay.as_secs()
        );
        return Action::requeue(delay);
    }

    error!("Reconciliation error for {}/{}: {}", namespace, name, error);

    let key = format!("{namespace}/{name}");
    let (delay, error_count) = ctx.next_backoff(&key);

    let next_retry = chrono::Duration::from_std(delay)
        .ok()
        .map(|d| (chrono::Utc::now() + d).to_rfc3339())
        .unwrap_or_default();
    info!(
        "Retrying with Fibonacci backoff: {}s (error count: {}, next retry: {})",
        delay.as_secs(),
        error_count,
        next_retry
    );

    Action::requeue(delay)
}
