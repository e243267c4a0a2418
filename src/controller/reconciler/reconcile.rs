//! # Reconcile
//!
//! One reconciliation pass for one Secret:
//!
//! 1. Fetch the Secret (gone means nothing to do)
//! 2. Snapshot its data
//! 3. Resolve each operation's annotation and run its transform on a local copy
//! 4. Compare the result with the snapshot
//! 5. Write the Secret once if anything changed
//! 6. Emit one event per change that was written
//!
//! A missing copy source stops the pass. Writes from earlier operations in
//! the same pass are dropped with it since nothing is persisted.

use crate::controller::reconciler::events::Severity;
use crate::controller::reconciler::store::StoreError;
use crate::controller::reconciler::types::{AppliedChange, PassOutcome, Reconciler, ReconcilerError};
use crate::observability::metrics;
use crate::transform::{self, SecretData, TransformSpec, OPERATIONS};
use k8s_openapi::api::core::v1::Secret;
use std::collections::BTreeSet;
use tracing::{debug, info, info_span, warn, Instrument};

impl Reconciler {
    /// Run one pass for the Secret `namespace/name`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcilerError`] when the Secret cannot be fetched or
    /// written. Transform failures are reported as events and are not errors.
    pub async fn reconcile(&self, namespace: &str, name: &str) -> Result<PassOutcome, ReconcilerError> {
        self.reconcile_inner(namespace, name)
            .instrument(info_span!("reconcile", namespace = %namespace, name = %name))
            .await
    }

    async fn reconcile_inner(&self, namespace: &str, name: &str) -> Result<PassOutcome, ReconcilerError> {
        let key = format!("{namespace}/{name}");

        let mut secret = match self.store.get(namespace, name).await {
            Ok(secret) => secret,
            Err(StoreError::NotFound { .. }) => {
                debug!("Secret no longer exists, nothing to do");
                return Ok(PassOutcome::SecretGone);
            }
            Err(source) => return Err(ReconcilerError::Fetch { key, source }),
        };

        let snapshot: SecretData = secret.data.clone().unwrap_or_default();
        let mut data = snapshot.clone();
        let annotations = secret.metadata.annotations.clone();
        let mut changes = Vec::new();

        for operation in &OPERATIONS {
            let Some(resolved) = operation.annotation.resolve(annotations.as_ref()) else {
                continue;
            };

            let result = match operation.transform {
                TransformSpec::MergePem => transform::merge_pem(name, &data, resolved),
                TransformSpec::CopyKey { source } => {
                    transform::copy_key(&data, source, resolved.value)
                }
            };

            match result {
                Ok(Some(write)) => {
                    debug!(
                        operation = operation.name,
                        annotation = resolved.key,
                        destination = %write.key,
                        "Destination key needs writing"
                    );
                    changes.push(AppliedChange::new(operation, &write));
                    data.insert(write.key, write.value);
                }
                Ok(None) => {
                    debug!(
                        operation = operation.name,
                        annotation = resolved.key,
                        "Destination key already up to date"
                    );
                }
                Err(error) if error.aborts_pass() => {
                    warn!(
                        operation = operation.name,
                        annotation = resolved.key,
                        error = %error,
                        "Copy failed, skipping the rest of this pass"
                    );
                    metrics::increment_transform_failures(error.reason());
                    let message = format!("annotation {}: {error}", resolved.key);
                    self.emit(&secret, Severity::Warning, error.reason(), &message)
                        .await;
                    return Ok(PassOutcome::Aborted {
                        annotation: resolved.key.to_string(),
                        error,
                    });
                }
                Err(error) => {
                    warn!(
                        operation = operation.name,
                        annotation = resolved.key,
                        error = %error,
                        "Transform skipped"
                    );
                    metrics::increment_transform_failures(error.reason());
                    self.emit(&secret, Severity::Warning, error.reason(), &error.to_string())
                        .await;
                }
            }
        }

        if data == snapshot {
            debug!("Secret data unchanged, skipping update");
            return Ok(PassOutcome::Unchanged);
        }
        let changes = effective_changes(changes, &snapshot, &data);

        secret.data = Some(data);
        let updated = match self.store.update(&secret).await {
            Ok(updated) => updated,
            Err(source @ StoreError::Conflict { .. }) => {
                return Err(ReconcilerError::Conflict { key, source })
            }
            Err(source) => return Err(ReconcilerError::Update { key, source }),
        };
        metrics::increment_secret_updates();

        for change in &changes {
            info!(
                reason = change.reason(),
                destination = change.destination(),
                "{}",
                change.message()
            );
            metrics::increment_transforms_applied(change.reason());
            self.emit(&updated, Severity::Normal, change.reason(), &change.message())
                .await;
        }

        Ok(PassOutcome::Updated { changes })
    }

    async fn emit(&self, secret: &Secret, severity: Severity, reason: &str, message: &str) {
        if let Err(e) = self.events.emit(secret, severity, reason, message).await {
            warn!(
                severity = severity.as_str(),
                reason,
                error = %e,
                "Failed to emit event"
            );
        }
    }
}

/// Keep the last write per destination, and only where the final value
/// differs from the snapshot.
fn effective_changes(
    changes: Vec<AppliedChange>,
    snapshot: &SecretData,
    data: &SecretData,
) -> Vec<AppliedChange> {
    let mut seen = BTreeSet::new();
    let mut effective: Vec<AppliedChange> = changes
        .into_iter()
        .rev()
        .filter(|change| seen.insert(change.destination().to_string()))
        .filter(|change| data.get(change.destination()) != snapshot.get(change.destination()))
        .collect();
    effective.reverse();
    effective
}
