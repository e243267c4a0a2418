//! # secret-transform
//!
//! A Kubernetes controller that derives extra data keys in Secrets from
//! annotations on those Secrets.
//!
//! ## Overview
//!
//! - `secret-transform/secret-transform: "tls.pem"` concatenates `tls.key`
//!   and `tls.crt` into a new `tls.pem` key
//! - `secret-transform/secret-copy-<key>: "<name>"` copies `<key>` (one of
//!   `ca.crt`, `tls.crt`, `tls.key`, `keystore.jks`, `truststore.jks`,
//!   `keystore.p12`, `truststore.p12`) into a key called `<name>`
//!
//! The `cert-manager.io/` annotation prefix used by earlier releases is still
//! honoured. Derived keys are kept in sync every time the Secret changes.
//!
//! ## Configuration
//!
//! See [`secret_transform::config::ControllerConfig`] for the environment
//! variables read at startup.

use anyhow::Result;
use secret_transform::runtime::{initialize, run_watch_loop};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;

    run_watch_loop(init.secrets, init.context, init.server_state).await?;

    info!("Controller stopped");
    Ok(())
}
