//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{
    CONTROLLER_NAME, DEFAULT_BACKOFF_MAX_SECS, DEFAULT_BACKOFF_MIN_SECS,
    DEFAULT_CONFLICT_REQUEUE_SECS, DEFAULT_LOG_LEVEL, DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
    DEFAULT_METRICS_PORT,
};
use std::str::FromStr;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// HTTP port for `/metrics`, `/healthz` and `/readyz`
    pub metrics_port: u16,
    /// Only watch Secrets in this namespace (all namespaces when unset)
    pub watch_namespace: Option<String>,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,
    pub log_format: LogFormat,
    pub enable_metrics: bool,
    /// Maximum reconciliations running at once
    pub max_concurrent_reconciliations: u16,
    /// First requeue delay after a failed pass (seconds)
    pub backoff_min_secs: u64,
    /// Cap on the requeue delay (seconds)
    pub backoff_max_secs: u64,
    /// Requeue delay after a write conflict (seconds)
    pub conflict_requeue_secs: u64,
    /// Controller name recorded on emitted events
    pub event_reporter: String,
    /// Instance recorded on emitted events (usually the pod name)
    pub pod_name: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            metrics_port: DEFAULT_METRICS_PORT,
            watch_namespace: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Text,
            enable_metrics: true,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            conflict_requeue_secs: DEFAULT_CONFLICT_REQUEUE_SECS,
            event_reporter: CONTROLLER_NAME.to_string(),
            pod_name: None,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            metrics_port: parse_or(&lookup, "METRICS_PORT", defaults.metrics_port),
            watch_namespace: non_empty(&lookup, "WATCH_NAMESPACE"),
            log_level: non_empty(&lookup, "LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: parse_or(&lookup, "LOG_FORMAT", defaults.log_format),
            enable_metrics: bool_or(&lookup, "ENABLE_METRICS", defaults.enable_metrics),
            max_concurrent_reconciliations: parse_or(
                &lookup,
                "MAX_CONCURRENT_RECONCILIATIONS",
                defaults.max_concurrent_reconciliations,
            ),
            backoff_min_secs: parse_or(&lookup, "BACKOFF_MIN_SECS", defaults.backoff_min_secs),
            backoff_max_secs: parse_or(&lookup, "BACKOFF_MAX_SECS", defaults.backoff_max_secs),
            conflict_requeue_secs: parse_or(
                &lookup,
                "CONFLICT_REQUEUE_SECS",
                defaults.conflict_requeue_secs,
            ),
            event_reporter: non_empty(&lookup, "EVENT_REPORTER").unwrap_or(defaults.event_reporter),
            pod_name: non_empty(&lookup, "POD_NAME"),
        }
    }

    /// Get conflict requeue duration
    #[must_use]
    pub fn conflict_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.conflict_requeue_secs)
    }
}

/// Parse a value or fall back to the default
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            let v_lower = v.trim().to_lowercase();
            v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
        })
        .unwrap_or(default)
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}
