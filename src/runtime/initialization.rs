//! # Initialization
//!
//! Controller initialization: configuration, tracing, rustls, metrics,
//! probe server startup and Kubernetes client setup.

use crate::config::ControllerConfig;
use crate::constants::{DEFAULT_SERVER_POLL_INTERVAL_MS, DEFAULT_SERVER_STARTUP_TIMEOUT_SECS};
use crate::controller::reconciler::{KubeEventSink, KubeSecretStore, Reconciler};
use crate::controller::server::{start_server, ServerState};
use crate::observability;
use crate::runtime::context::ControllerContext;
use anyhow::{bail, Context, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::{api::Api, Client};
use kube_runtime::events::Reporter;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Everything the watch loop needs
pub struct InitializationResult {
    /// Secrets to watch (one namespace or all)
    pub secrets: Api<Secret>,
    pub context: Arc<ControllerContext>,
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.ready())
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// # Errors
///
/// Fails if tracing or metrics cannot be set up, the probe server does not
/// come up, or no Kubernetes client configuration is available.
pub async fn initialize() -> Result<InitializationResult> {
    let config = ControllerConfig::from_env();

    observability::logging::init_tracing(&config)?;

    info!("Starting secret-transform controller");
    info!(
        "Build info: timestamp={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_GIT_HASH")
    );

    // Required for rustls 0.23+ when no default provider is set via features
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    if config.enable_metrics {
        observability::metrics::register_metrics()?;
    }

    let server_state = Arc::new(ServerState::default());

    let server_port = config.metrics_port;
    let server_state_clone = Arc::clone(&server_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(server_port, &server_handle).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let secrets: Api<Secret> = match &config.watch_namespace {
        Some(namespace) => {
            info!("Watching Secrets in namespace {}", namespace);
            Api::namespaced(client.clone(), namespace)
        }
        None => {
            info!("Watching Secrets in all namespaces");
            Api::all(client.clone())
        }
    };

    let reporter = Reporter {
        controller: config.event_reporter.clone(),
        instance: config.pod_name.clone(),
    };
    let reconciler = Reconciler::new(
        Arc::new(KubeSecretStore::new(client.clone())),
        Arc::new(KubeEventSink::new(client, reporter)),
    );
    let context = Arc::new(ControllerContext::new(reconciler, config));

    server_state.set_ready(true);

    Ok(InitializationResult {
        secrets,
        context,
        server_state,
    })
}

/// Poll the probe server until it accepts connections
async fn wait_for_server_ready(port: u16, server_handle: &JoinHandle<()>) -> Result<()> {
    let timeout = Duration::from_secs(DEFAULT_SERVER_STARTUP_TIMEOUT_SECS);
    let poll_interval = Duration::from_millis(DEFAULT_SERVER_POLL_INTERVAL_MS);
    let start = tokio::time::Instant::now();

    loop {
        if server_handle.is_finished() {
            bail!("HTTP server exited during startup");
        }
        if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            info!("HTTP server ready on port {}", port);
            return Ok(());
        }
        if start.elapsed() >= timeout {
            bail!(
                "HTTP server did not become ready within {}s",
                timeout.as_secs()
            );
        }
        tokio::time::sleep(poll_interval).await;
    }
}
