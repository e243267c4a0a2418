//! Common test utilities
//!
//! In-memory [`SecretStore`] and recording [`EventSink`] so reconciliation
//! passes can run without a cluster.

#![allow(dead_code, reason = "Not every test binary uses every helper")]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use secret_transform::controller::reconciler::{
    EventSink, Reconciler, SecretStore, Severity, StoreError,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const NAMESPACE: &str = "default";
pub const NAME: &str = "test-secret";

/// Failure injected into the next store calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    None,
    GetFails,
    UpdateConflicts,
    UpdateFails,
}

#[derive(Debug)]
pub struct InMemorySecretStore {
    secrets: Mutex<BTreeMap<(String, String), Secret>>,
    failure: Mutex<Failure>,
    gets: AtomicUsize,
    updates: AtomicUsize,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self {
            secrets: Mutex::new(BTreeMap::new()),
            failure: Mutex::new(Failure::None),
            gets: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn with_secret(secret: Secret) -> Self {
        let store = Self::new();
        store.insert(secret);
        store
    }

    pub fn insert(&self, secret: Secret) {
        let key = (
            secret.metadata.namespace.clone().unwrap_or_default(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        self.secrets.lock().unwrap().insert(key, secret);
    }

    pub fn fail_with(&self, failure: Failure) {
        *self.failure.lock().unwrap() = failure;
    }

    pub fn stored(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Data of the default test Secret as UTF-8 strings
    pub fn stored_data(&self) -> BTreeMap<String, String> {
        self.stored(NAMESPACE, NAME)
            .and_then(|s| s.data)
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, String::from_utf8(v.0).unwrap()))
            .collect()
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if *self.failure.lock().unwrap() == Failure::GetFails {
            return Err(StoreError::Request(anyhow!("connection refused")));
        }
        self.stored(namespace, name)
            .ok_or_else(|| StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn update(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let namespace = secret.metadata.namespace.clone().unwrap_or_default();
        let name = secret.metadata.name.clone().unwrap_or_default();

        match *self.failure.lock().unwrap() {
            Failure::UpdateConflicts => {
                return Err(StoreError::Conflict {
                    namespace,
                    name,
                    message: "the object has been modified".to_string(),
                })
            }
            Failure::UpdateFails => return Err(StoreError::Request(anyhow!("internal error"))),
            Failure::None | Failure::GetFails => {}
        }

        let mut secrets = self.secrets.lock().unwrap();
        let key = (namespace.clone(), name.clone());
        let current = secrets.get(&key).ok_or_else(|| StoreError::NotFound {
            namespace: namespace.clone(),
            name: name.clone(),
        })?;
        if current.metadata.resource_version != secret.metadata.resource_version {
            return Err(StoreError::Conflict {
                namespace,
                name,
                message: "resourceVersion mismatch".to_string(),
            });
        }

        let next_version = current
            .metadata
            .resource_version
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        let mut stored = secret.clone();
        stored.metadata.resource_version = Some(next_version.to_string());
        secrets.insert(key, stored.clone());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub secret: String,
    pub severity: Severity,
    pub reason: String,
    pub message: String,
}

impl RecordedEvent {
    /// `"<Severity> <Reason> <message>"`
    pub fn line(&self) -> String {
        format!("{} {} {}", self.severity.as_str(), self.reason, self.message)
    }
}

#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<RecordedEvent>>,
    fail: Mutex<bool>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::default();
        *sink.fail.lock().unwrap() = true;
        sink
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(RecordedEvent::line).collect()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn emit(
        &self,
        secret: &Secret,
        severity: Severity,
        reason: &str,
        message: &str,
    ) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(anyhow!("events API unavailable"));
        }
        self.events.lock().unwrap().push(RecordedEvent {
            secret: secret.metadata.name.clone().unwrap_or_default(),
            severity,
            reason: reason.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Build the default test Secret
pub fn secret(annotations: &[(&str, &str)], data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(NAME.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            resource_version: Some("1".to_string()),
            annotations: Some(
                annotations
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
            ..ObjectMeta::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        ..Secret::default()
    }
}

/// A reconciler wired to fresh fakes holding `given`
pub fn harness(given: Secret) -> (Reconciler, Arc<InMemorySecretStore>, Arc<RecordingEventSink>) {
    let store = Arc::new(InMemorySecretStore::with_secret(given));
    let events = Arc::new(RecordingEventSink::new());
    let reconciler = Reconciler::new(store.clone(), events.clone());
    (reconciler, store, events)
}
