//! gateflow control-plane client
//!
//! One trait covers every external call the stack makes; the shipped
//! implementation wraps the `aws` CLI. Failures carry the control plane's
//! own fault text so nothing gets lost in translation.

pub mod api;
pub mod awscli;
pub mod error;
pub mod types;

pub use api::ControlPlane;
pub use awscli::AwsCli;
pub use error::{ControlPlaneError, Result};
pub use types::*;
