//! gateflow stack
//!
//! Concrete resource managers for the protocol-translation gateway and
//! the [`GatewayStack`] orchestrator that assembles them into a
//! dependency graph from a deployment config.

pub mod bucket;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod outputs;
pub mod role;
pub mod stack;
pub mod target;

pub use error::{Result, StackError};
pub use gateway::MCP_PROTOCOL_VERSION;
pub use identity::AuthBinding;
pub use outputs::{StackOutputs, TargetOutput};
pub use stack::{GatewayStack, target_keys, KEY_BUCKET, KEY_GATEWAY, KEY_IDENTITY, KEY_ROLE};
