//! Deployment engine
//!
//! Diffs the desired resource graph against recorded state to produce a
//! plan, then applies it in dependency order. The first failing action
//! aborts the run; already-applied resources keep their new state and the
//! control plane is left to its own rollback policy.

use crate::action::{Action, ActionType, ApplyResult, Plan};
use crate::error::Result;
use crate::graph::ResourceGraph;
use crate::resource::{DynDeleter, DynResource, ResourceContext};
use crate::state::GlobalState;
use std::collections::HashMap;

#[derive(Default)]
pub struct Engine {
    nodes: Vec<Box<dyn DynResource>>,
    deleters: HashMap<String, Box<dyn DynDeleter>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Box<dyn DynResource>) {
        self.nodes.push(node);
    }

    /// Register a deleter for a resource type so records whose node left
    /// the graph can still be torn down
    pub fn register_deleter(&mut self, resource_type: impl Into<String>, deleter: Box<dyn DynDeleter>) {
        self.deleters.insert(resource_type.into(), deleter);
    }

    fn node(&self, key: &str) -> Option<&dyn DynResource> {
        self.nodes.iter().find(|n| n.key() == key).map(|n| n.as_ref())
    }

    fn graph(&self) -> Result<ResourceGraph> {
        let mut graph = ResourceGraph::new();
        for node in &self.nodes {
            graph.add(node.key(), node.dependencies().to_vec())?;
        }
        Ok(graph)
    }

    /// Compute the plan: orphan deletes first, then creates/updates in
    /// dependency order
    pub fn plan(&self, state: &GlobalState) -> Result<Plan> {
        let graph = self.graph()?;
        let order = graph.deploy_order()?;

        let mut actions = Vec::new();

        let mut orphans: Vec<&String> = state
            .resources
            .keys()
            .filter(|key| !graph.contains(key))
            .collect();
        orphans.sort();
        orphans.reverse();
        for key in orphans {
            let record = &state.resources[key];
            actions.push(Action {
                action_type: ActionType::Delete,
                resource_type: record.resource_type.clone(),
                key: key.clone(),
                description: format!("delete {} (no longer configured)", key),
            });
        }

        for key in order {
            let node = self.node(&key).expect("graph built from nodes");
            let desired = node.params_digest()?;
            let action_type = match state.get_resource(&key) {
                Some(record) if record.params_digest.as_deref() == Some(desired.as_str()) => {
                    ActionType::NoOp
                }
                // Records from before digests were tracked replan as updates
                Some(_) => ActionType::Update,
                None => ActionType::Create,
            };
            actions.push(Action {
                action_type,
                resource_type: node.resource_type().to_string(),
                key: key.clone(),
                description: format!("{} {}", action_type, key),
            });
        }

        Ok(Plan::new(actions))
    }

    /// Apply a plan, mutating `state` as each action lands
    pub async fn apply(&self, plan: &Plan, state: &mut GlobalState) -> Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            match action.action_type {
                ActionType::Create => {
                    let node = match self.node(&action.key) {
                        Some(node) => node,
                        None => {
                            result.set_failure(
                                action.key.clone(),
                                "no resource node for planned action".to_string(),
                            );
                            break;
                        }
                    };
                    let digest = node.params_digest()?;
                    tracing::info!(key = %action.key, "Creating resource");
                    let created = {
                        let ctx = ResourceContext::new(&state.resources);
                        node.create(&ctx).await
                    };
                    match created {
                        Ok(mut record) => {
                            record.params_digest = Some(digest);
                            result.add_success(
                                action.key.clone(),
                                format!("created {} ({})", action.key, record.physical_id),
                            );
                            state.set_resource(action.key.clone(), record);
                        }
                        Err(e) => {
                            result.set_failure(action.key.clone(), e.to_string());
                            break;
                        }
                    }
                }
                ActionType::Update => {
                    let node = match self.node(&action.key) {
                        Some(node) => node,
                        None => {
                            result.set_failure(
                                action.key.clone(),
                                "no resource node for planned action".to_string(),
                            );
                            break;
                        }
                    };
                    let previous = match state.get_resource(&action.key).cloned() {
                        Some(record) => record,
                        None => {
                            result.set_failure(
                                action.key.clone(),
                                "no recorded state for planned update".to_string(),
                            );
                            break;
                        }
                    };
                    let digest = node.params_digest()?;
                    tracing::info!(key = %action.key, id = %previous.physical_id, "Updating resource");
                    let updated = {
                        let ctx = ResourceContext::new(&state.resources);
                        node.update(&ctx, &previous).await
                    };
                    match updated {
                        Ok(mut record) => {
                            record.params_digest = Some(digest);
                            result.add_success(
                                action.key.clone(),
                                format!("updated {} ({})", action.key, record.physical_id),
                            );
                            state.set_resource(action.key.clone(), record);
                        }
                        Err(e) => {
                            result.set_failure(action.key.clone(), e.to_string());
                            break;
                        }
                    }
                }
                ActionType::Delete => {
                    if let Err(e) = self.delete_record(&action.key, state).await {
                        result.set_failure(action.key.clone(), e);
                        break;
                    }
                    result.add_success(action.key.clone(), format!("deleted {}", action.key));
                }
                ActionType::NoOp => {}
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Tear down everything in strict reverse dependency order
    pub async fn destroy(&self, state: &mut GlobalState) -> Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        let graph = self.graph()?;
        let mut keys = graph.teardown_order()?;

        // Records with no node left still get deleted, after everything else
        let mut leftovers: Vec<String> = state
            .resources
            .keys()
            .filter(|key| !graph.contains(key))
            .cloned()
            .collect();
        leftovers.sort();
        leftovers.reverse();
        keys.extend(leftovers);

        for key in keys {
            if state.get_resource(&key).is_none() {
                continue;
            }
            if let Err(e) = self.delete_record(&key, state).await {
                result.set_failure(key, e);
                break;
            }
            result.add_success(key.clone(), format!("deleted {}", key));
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn delete_record(
        &self,
        key: &str,
        state: &mut GlobalState,
    ) -> std::result::Result<(), String> {
        let record = match state.get_resource(key) {
            Some(record) => record.clone(),
            None => return Ok(()),
        };

        tracing::info!(key, id = %record.physical_id, "Deleting resource");

        let outcome = if let Some(node) = self.node(key) {
            node.delete(&record).await
        } else if let Some(deleter) = self.deleters.get(&record.resource_type) {
            deleter.delete(&record).await
        } else {
            return Err(format!(
                "no deleter registered for resource type '{}'",
                record.resource_type
            ));
        };

        outcome.map_err(|e| e.to_string())?;
        state.remove_resource(key);
        Ok(())
    }
}
