//! gateflow provisioning engine
//!
//! Generic declarative lifecycle over external resources: typed
//! create/update/delete capabilities ([`Provisionable`]), a dependency
//! graph with explicit edges, plan/apply execution and a state file that
//! makes re-runs idempotent. Nothing in this crate knows what a gateway
//! is; the stack crate supplies the concrete resources.

pub mod action;
pub mod engine;
pub mod error;
pub mod graph;
pub mod resource;
pub mod state;

pub use action::{Action, ActionOutcome, ActionType, ApplyResult, Plan, PlanSummary};
pub use engine::Engine;
pub use error::{BoxError, ProvisionError, ResourceResult, Result};
pub use graph::ResourceGraph;
pub use resource::{
    DynDeleter, DynResource, Provisionable, ResourceContext, ResourceNode, TypeDeleter,
};
pub use state::{GlobalState, ResourceRecord, StateLock, StateManager};
