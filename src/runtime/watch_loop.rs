//! # Watch Loop
//!
//! Watches Secrets and dispatches a reconciliation for every change worth
//! looking at. kube-runtime runs at most one pass per Secret at a time and
//! passes for different Secrets concurrently.

use crate::controller::reconciler::{PassOutcome, ReconcilerError};
use crate::controller::server::ServerState;
use crate::observability::metrics;
use crate::runtime::context::ControllerContext;
use crate::runtime::error_policy::handle_reconciliation_error;
use crate::transform::should_reconcile;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube::ResourceExt;
use kube_runtime::controller::{Action, Config as ControllerRunConfig};
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run the controller until a shutdown signal is received
///
/// # Errors
///
/// Currently infallible; the signature leaves room for startup failures.
pub async fn run_watch_loop(
    secrets: Api<Secret>,
    context: Arc<ControllerContext>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    info!("Starting controller watch loop...");

    let run_config =
        ControllerRunConfig::default().concurrency(context.config.max_concurrent_reconciliations);

    Controller::new(secrets, watcher::Config::default().any_semantic())
        .with_config(run_config)
        .shutdown_on_signal()
        .run(reconcile_secret, handle_reconciliation_error, context)
        .for_each(|result| {
            match result {
                Ok((object, _action)) => debug!("Reconciled {}", object),
                Err(e) => warn!("Controller stream error: {}", e),
            }
            futures::future::ready(())
        })
        .await;

    server_state.set_ready(false);
    info!("Controller stopped gracefully");
    Ok(())
}

/// Entry point the controller calls for every queued Secret
pub async fn reconcile_secret(
    secret: Arc<Secret>,
    ctx: Arc<ControllerContext>,
) -> Result<Action, ReconcilerError> {
    let name = secret.name_any();
    let namespace = secret.namespace().unwrap_or_else(|| "default".to_string());

    if !should_reconcile(secret.metadata.annotations.as_ref()) {
        metrics::increment_reconciliations_skipped();
        ctx.reset_backoff(&format!("{namespace}/{name}"));
        return Ok(Action::await_change());
    }

    metrics::increment_reconciliations();
    let start = Instant::now();
    let result = ctx.reconciler.reconcile(&namespace, &name).await;
    metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

    let outcome = result?;
    ctx.reset_backoff(&format!("{namespace}/{name}"));

    match &outcome {
        PassOutcome::Updated { changes } => {
            info!("Updated Secret {}/{} ({} key(s) written)", namespace, name, changes.len());
        }
        PassOutcome::Aborted { annotation, error } => {
            warn!(
                "Skipped Secret {}/{}: annotation {}: {}",
                namespace, name, annotation, error
            );
        }
        PassOutcome::Unchanged | PassOutcome::SecretGone => {
            debug!("Nothing to do for Secret {}/{}", namespace, name);
        }
    }

    Ok(Action::await_change())
}
