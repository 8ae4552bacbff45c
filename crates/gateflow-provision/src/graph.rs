//! Resource dependency graph
//!
//! Deploy order is a deterministic topological sort over the declared
//! `depends_on` edges; teardown walks the exact reverse.

use crate::error::{ProvisionError, Result};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct ResourceGraph {
    /// key -> dependency keys
    edges: BTreeMap<String, Vec<String>>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, depends_on: Vec<String>) -> Result<()> {
        let key = key.into();
        if self.edges.contains_key(&key) {
            return Err(ProvisionError::DuplicateResource(key));
        }
        self.edges.insert(key, depends_on);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.edges.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Keys in apply order: every resource after all of its dependencies.
    /// Ties break alphabetically so plans are stable run to run.
    pub fn deploy_order(&self) -> Result<Vec<String>> {
        for (key, deps) in &self.edges {
            for dep in deps {
                if !self.edges.contains_key(dep) {
                    return Err(ProvisionError::UnknownDependency {
                        resource: key.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let mut remaining: BTreeMap<&str, BTreeSet<&str>> = self
            .edges
            .iter()
            .map(|(k, deps)| (k.as_str(), deps.iter().map(String::as_str).collect()))
            .collect();

        let mut order = Vec::with_capacity(self.edges.len());
        while !remaining.is_empty() {
            // BTreeMap iteration keeps the ready set sorted
            let ready: Vec<&str> = remaining
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(k, _)| *k)
                .collect();

            if ready.is_empty() {
                let stuck: Vec<&str> = remaining.keys().copied().collect();
                return Err(ProvisionError::CircularDependency(stuck.join(" -> ")));
            }

            for key in ready {
                remaining.remove(key);
                for deps in remaining.values_mut() {
                    deps.remove(key);
                }
                order.push(key.to_string());
            }
        }

        Ok(order)
    }

    /// Strict reverse dependency order for stack teardown
    pub fn teardown_order(&self) -> Result<Vec<String>> {
        let mut order = self.deploy_order()?;
        order.reverse();
        Ok(order)
    }
}
