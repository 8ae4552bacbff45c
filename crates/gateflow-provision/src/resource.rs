//! Resource lifecycle abstraction
//!
//! A `Provisionable` turns three control-plane calls into one declarative
//! lifecycle: create captures a physical id, update and delete reuse it.
//! Each implementation supplies its own typed params and state; the engine
//! works on the erased [`DynResource`] view and stores state as JSON.

use crate::error::{BoxError, ProvisionError, ResourceResult};
use crate::state::ResourceRecord;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Typed create/update/delete capability over one kind of external resource
#[async_trait]
pub trait Provisionable: Send + Sync {
    type Params: Serialize + Send + Sync;
    type State: Serialize + DeserializeOwned + Send + Sync;

    /// Resource type key used in state records and plan output
    fn resource_type(&self) -> &str;

    /// The control-plane identifier captured in this state
    fn physical_id(&self, state: &Self::State) -> String;

    async fn create(
        &self,
        ctx: &ResourceContext<'_>,
        params: &Self::Params,
    ) -> ResourceResult<Self::State>;

    async fn update(
        &self,
        ctx: &ResourceContext<'_>,
        state: &Self::State,
        params: &Self::Params,
    ) -> ResourceResult<Self::State>;

    async fn delete(&self, state: &Self::State) -> ResourceResult<()>;
}

/// Lookup view over already-applied resources, for late-bound references
/// (a target needs the gateway id the control plane returned moments ago)
pub struct ResourceContext<'a> {
    records: &'a HashMap<String, ResourceRecord>,
}

impl<'a> ResourceContext<'a> {
    pub fn new(records: &'a HashMap<String, ResourceRecord>) -> Self {
        Self { records }
    }

    pub fn physical_id(&self, key: &str) -> ResourceResult<String> {
        self.records
            .get(key)
            .map(|r| r.physical_id.clone())
            .ok_or_else(|| missing(key))
    }

    /// Deserialize the recorded state of an upstream resource
    pub fn state_of<S: DeserializeOwned>(&self, key: &str) -> ResourceResult<S> {
        let record = self.records.get(key).ok_or_else(|| missing(key))?;
        Ok(serde_json::from_value(record.state.clone())?)
    }
}

fn missing(key: &str) -> BoxError {
    Box::new(ProvisionError::State(format!(
        "no applied resource with key '{key}' (dependency not declared?)"
    )))
}

/// One node in the deployment graph: a provisioner bound to its params,
/// logical key and dependency edges
pub struct ResourceNode<P: Provisionable> {
    key: String,
    depends_on: Vec<String>,
    provisioner: P,
    params: P::Params,
}

impl<P: Provisionable> ResourceNode<P> {
    pub fn new(key: impl Into<String>, provisioner: P, params: P::Params) -> Self {
        Self {
            key: key.into(),
            depends_on: Vec::new(),
            provisioner,
            params,
        }
    }

    /// Declare explicit ordering: this node is applied after `keys`
    pub fn depends_on(mut self, keys: &[&str]) -> Self {
        self.depends_on.extend(keys.iter().map(|k| k.to_string()));
        self
    }
}

/// Object-safe view the engine executes
#[async_trait]
pub trait DynResource: Send + Sync {
    fn key(&self) -> &str;
    fn resource_type(&self) -> &str;
    fn dependencies(&self) -> &[String];

    /// Digest of the desired params; a record carrying the same digest
    /// needs no control-plane call
    fn params_digest(&self) -> serde_json::Result<String>;

    async fn create(&self, ctx: &ResourceContext<'_>) -> ResourceResult<ResourceRecord>;
    async fn update(
        &self,
        ctx: &ResourceContext<'_>,
        record: &ResourceRecord,
    ) -> ResourceResult<ResourceRecord>;
    async fn delete(&self, record: &ResourceRecord) -> ResourceResult<()>;
}

#[async_trait]
impl<P: Provisionable> DynResource for ResourceNode<P> {
    fn key(&self) -> &str {
        &self.key
    }

    fn resource_type(&self) -> &str {
        self.provisioner.resource_type()
    }

    fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    fn params_digest(&self) -> serde_json::Result<String> {
        let encoded = serde_json::to_vec(&self.params)?;
        Ok(format!("{:x}", Sha256::digest(&encoded)))
    }

    async fn create(&self, ctx: &ResourceContext<'_>) -> ResourceResult<ResourceRecord> {
        let state = self.provisioner.create(ctx, &self.params).await?;
        Ok(ResourceRecord::new(
            self.provisioner.physical_id(&state),
            self.provisioner.resource_type(),
            serde_json::to_value(&state)?,
        ))
    }

    async fn update(
        &self,
        ctx: &ResourceContext<'_>,
        record: &ResourceRecord,
    ) -> ResourceResult<ResourceRecord> {
        let previous: P::State = serde_json::from_value(record.state.clone())?;
        let next = self.provisioner.update(ctx, &previous, &self.params).await?;
        let physical_id = self.provisioner.physical_id(&next);
        Ok(record.clone().updated(physical_id, serde_json::to_value(&next)?))
    }

    async fn delete(&self, record: &ResourceRecord) -> ResourceResult<()> {
        let state: P::State = serde_json::from_value(record.state.clone())?;
        self.provisioner.delete(&state).await
    }
}

/// Deletes recorded resources of one type when no graph node remains for
/// them (e.g. a target removed from the config, or the identity pool after
/// switching to ambient-credential auth)
#[async_trait]
pub trait DynDeleter: Send + Sync {
    async fn delete(&self, record: &ResourceRecord) -> ResourceResult<()>;
}

pub struct TypeDeleter<P: Provisionable> {
    provisioner: P,
}

impl<P: Provisionable> TypeDeleter<P> {
    pub fn new(provisioner: P) -> Self {
        Self { provisioner }
    }
}

#[async_trait]
impl<P: Provisionable> DynDeleter for TypeDeleter<P> {
    async fn delete(&self, record: &ResourceRecord) -> ResourceResult<()> {
        let state: P::State = serde_json::from_value(record.state.clone())?;
        self.provisioner.delete(&state).await
    }
}
