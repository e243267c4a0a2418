//! # Runtime
//!
//! Controller host: bootstrap, the Secret watch loop and the error policy
//! that decides when failed passes are retried.

pub mod context;
pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

pub use context::{BackoffState, ControllerContext};
pub use initialization::{initialize, InitializationResult};
pub use watch_loop::run_watch_loop;
