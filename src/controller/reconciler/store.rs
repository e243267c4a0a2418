//! # Secret Store
//!
//! Fetch and optimistic update of the managed Secret.

use anyhow::anyhow;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, PostParams};
use kube::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("secret {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    /// The object changed since it was read (HTTP 409)
    #[error("secret {namespace}/{name} was modified concurrently: {message}")]
    Conflict {
        namespace: String,
        name: String,
        message: String,
    },

    #[error("secret store request failed: {0}")]
    Request(#[from] anyhow::Error),
}

/// Access to Secrets for the reconciler
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Get a Secret by namespace and name
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret, StoreError>;

    /// Replace a Secret. Fails with [`StoreError::Conflict`] when the
    /// `resourceVersion` carried by `secret` is no longer current.
    async fn update(&self, secret: &Secret) -> Result<Secret, StoreError>;
}

/// [`SecretStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore").finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret, StoreError> {
        self.api(namespace)
            .get(name)
            .await
            .map_err(|e| classify_kube_error(namespace, name, e))
    }

    async fn update(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let namespace = secret.metadata.namespace.as_deref().unwrap_or("default");
        let name = secret
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| StoreError::Request(anyhow!("secret in {namespace} has no name")))?;

        self.api(namespace)
            .replace(name, &PostParams::default(), secret)
            .await
            .map_err(|e| classify_kube_error(namespace, name, e))
    }
}

fn classify_kube_error(namespace: &str, name: &str, error: kube::Error) -> StoreError {
    match error {
        kube::Error::Api(ref response) if response.code == 404 => StoreError::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(ref response) if response.code == 409 => StoreError::Conflict {
            namespace: namespace.to_string(),
            name: name.to_string(),
            message: response.message.clone(),
        },
        other => StoreError::Request(
            anyhow::Error::new(other).context(format!("secret {namespace}/{name}")),
        ),
    }
}
