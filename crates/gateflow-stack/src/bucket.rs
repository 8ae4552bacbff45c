//! Schema bucket manager
//!
//! One private bucket holds the materialized schema documents. Exactly one
//! external service principal gets read access, conditioned on the source
//! account. Objects are derived artifacts, so teardown purges them before
//! deleting the bucket.

use async_trait::async_trait;
use gateflow_controlplane::ControlPlane;
use gateflow_provision::{Provisionable, ResourceContext, ResourceResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "schema-bucket";

/// Service principal allowed to read schema documents
pub const SCHEMA_READER_PRINCIPAL: &str = "bedrock-agentcore.amazonaws.com";

pub struct SchemaBucketManager {
    cp: Arc<dyn ControlPlane>,
}

impl SchemaBucketManager {
    pub fn new(cp: Arc<dyn ControlPlane>) -> Self {
        Self { cp }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaBucketSpec {
    pub bucket_name: String,
    pub source_account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaBucketState {
    pub name: String,
    pub arn: String,
}

/// Read-only grant for the gateway service, scoped to this account's use
fn read_policy(spec: &SchemaBucketSpec) -> serde_json::Value {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "GatewaySchemaRead",
                "Effect": "Allow",
                "Principal": { "Service": SCHEMA_READER_PRINCIPAL },
                "Action": ["s3:GetObject"],
                "Resource": format!("arn:aws:s3:::{}/*", spec.bucket_name),
                "Condition": {
                    "StringEquals": { "aws:SourceAccount": spec.source_account }
                }
            }
        ]
    })
}

#[async_trait]
impl Provisionable for SchemaBucketManager {
    type Params = SchemaBucketSpec;
    type State = SchemaBucketState;

    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    fn physical_id(&self, state: &Self::State) -> String {
        state.name.clone()
    }

    async fn create(
        &self,
        _ctx: &ResourceContext<'_>,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        self.cp.create_bucket(&spec.bucket_name).await?;
        self.cp
            .put_bucket_policy(&spec.bucket_name, &read_policy(spec))
            .await?;

        Ok(SchemaBucketState {
            name: spec.bucket_name.clone(),
            arn: format!("arn:aws:s3:::{}", spec.bucket_name),
        })
    }

    async fn update(
        &self,
        _ctx: &ResourceContext<'_>,
        state: &Self::State,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        // Bucket names are deterministic, so only the policy can drift
        self.cp
            .put_bucket_policy(&state.name, &read_policy(spec))
            .await?;
        Ok(state.clone())
    }

    async fn delete(&self, state: &Self::State) -> ResourceResult<()> {
        self.cp.purge_bucket(&state.name).await?;
        self.cp.delete_bucket(&state.name).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_policy_scoping() {
        let spec = SchemaBucketSpec {
            bucket_name: "demo-schemas-abc123".to_string(),
            source_account: "123456789012".to_string(),
        };

        let policy = read_policy(&spec);
        let statement = &policy["Statement"][0];

        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Principal"]["Service"], SCHEMA_READER_PRINCIPAL);
        assert_eq!(statement["Action"][0], "s3:GetObject");
        assert_eq!(
            statement["Resource"],
            "arn:aws:s3:::demo-schemas-abc123/*"
        );
        assert_eq!(
            statement["Condition"]["StringEquals"]["aws:SourceAccount"],
            "123456789012"
        );
    }
}
