//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `secret_transform_reconciliations_total` - Total number of reconciliation passes
//! - `secret_transform_reconciliation_errors_total` - Passes that failed and were requeued
//! - `secret_transform_reconciliation_duration_seconds` - Duration of reconciliation passes
//! - `secret_transform_reconciliations_skipped_total` - Secrets dropped by the trigger filter
//! - `secret_transform_secret_updates_total` - Secrets written back
//! - `secret_transform_transforms_applied_total` - Applied changes by event reason
//! - `secret_transform_transform_failures_total` - Transform failures by event reason

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_transform_reconciliations_total",
        "Total number of reconciliation passes",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_transform_reconciliation_errors_total",
        "Total number of reconciliation passes that failed",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "secret_transform_reconciliation_duration_seconds",
            "Duration of reconciliation passes in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static RECONCILIATIONS_SKIPPED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_transform_reconciliations_skipped_total",
        "Total number of Secret changes ignored because no transform annotation is set",
    )
    .expect("Failed to create RECONCILIATIONS_SKIPPED_TOTAL metric - this should never happen")
});

static SECRET_UPDATES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_transform_secret_updates_total",
        "Total number of Secrets written back",
    )
    .expect("Failed to create SECRET_UPDATES_TOTAL metric - this should never happen")
});

static TRANSFORMS_APPLIED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_transform_transforms_applied_total",
            "Total number of destination keys written, by event reason",
        ),
        &["reason"],
    )
    .expect("Failed to create TRANSFORMS_APPLIED_TOTAL metric - this should never happen")
});

static TRANSFORM_FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_transform_transform_failures_total",
            "Total number of transform failures, by event reason",
        ),
        &["reason"],
    )
    .expect("Failed to create TRANSFORM_FAILURES_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Fails only if a metric is registered twice"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATIONS_SKIPPED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SECRET_UPDATES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(TRANSFORMS_APPLIED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(TRANSFORM_FAILURES_TOTAL.clone()))?;

    Ok(())
}

/// Render every registered metric in the Prometheus text format
///
/// # Errors
///
/// Returns an error if a metric family cannot be encoded.
pub fn render() -> Result<String> {
    Ok(TextEncoder::new().encode_to_string(&REGISTRY.gather())?)
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_reconciliations_skipped() {
    RECONCILIATIONS_SKIPPED_TOTAL.inc();
}

pub fn increment_secret_updates() {
    SECRET_UPDATES_TOTAL.inc();
}

pub fn increment_transforms_applied(reason: &str) {
    TRANSFORMS_APPLIED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn increment_transform_failures(reason: &str) {
    TRANSFORM_FAILURES_TOTAL.with_label_values(&[reason]).inc();
}
