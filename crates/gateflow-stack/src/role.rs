//! Gateway execution role
//!
//! The gateway assumes a single role at runtime. Its inline policy is
//! assembled from what the deployment actually uses: log and trace sinks
//! always, schema bucket reads only when a bucket exists, tool invocation
//! only when function targets exist, and target synchronization only when
//! semantic search is enabled.

use async_trait::async_trait;
use gateflow_controlplane::ControlPlane;
use gateflow_provision::{Provisionable, ResourceContext, ResourceResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "execution-role";

/// Name of the inline policy attached to the role
const POLICY_NAME: &str = "gateway-execution";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub sid: String,
    pub effect: &'static str,
    pub action: Vec<String>,
    pub resource: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<serde_json::Value>,
}

impl PolicyStatement {
    fn allow(sid: &str, actions: &[&str], resources: &[String]) -> Self {
        Self {
            sid: sid.to_string(),
            effect: "Allow",
            action: actions.iter().map(|a| a.to_string()).collect(),
            resource: resources.to_vec(),
            condition: None,
        }
    }
}

/// Everything that widens or narrows the execution policy
#[derive(Debug, Clone, Serialize)]
pub struct PolicyInputs {
    pub account: String,
    pub region: String,
    pub bucket_arns: Vec<String>,
    pub function_arns: Vec<String>,
    pub semantic_search: bool,
}

/// The inline policy document for the gateway runtime
pub fn execution_policy(inputs: &PolicyInputs) -> PolicyDocument {
    let mut statements = vec![
        PolicyStatement::allow(
            "GatewayLogs",
            &[
                "logs:CreateLogGroup",
                "logs:CreateLogStream",
                "logs:PutLogEvents",
            ],
            &[format!(
                "arn:aws:logs:{}:{}:log-group:/aws/bedrock-agentcore/gateways/*",
                inputs.region, inputs.account
            )],
        ),
        PolicyStatement::allow(
            "GatewayTracing",
            &[
                "xray:PutTraceSegments",
                "xray:PutTelemetryRecords",
                "xray:GetSamplingRules",
                "xray:GetSamplingTargets",
            ],
            &["*".to_string()],
        ),
        PolicyStatement {
            sid: "GatewayMetrics".to_string(),
            effect: "Allow",
            action: vec!["cloudwatch:PutMetricData".to_string()],
            resource: vec!["*".to_string()],
            condition: Some(serde_json::json!({
                "StringEquals": { "cloudwatch:namespace": "bedrock-agentcore" }
            })),
        },
    ];

    if !inputs.bucket_arns.is_empty() {
        let objects: Vec<String> = inputs
            .bucket_arns
            .iter()
            .map(|arn| format!("{arn}/*"))
            .collect();
        statements.push(PolicyStatement::allow(
            "SchemaRead",
            &["s3:GetObject"],
            &objects,
        ));
    }

    if !inputs.function_arns.is_empty() {
        statements.push(PolicyStatement::allow(
            "ToolInvoke",
            &["lambda:InvokeFunction"],
            &inputs.function_arns,
        ));
    }

    if inputs.semantic_search {
        statements.push(PolicyStatement::allow(
            "TargetSync",
            &["bedrock-agentcore:SynchronizeGatewayTargets"],
            &["*".to_string()],
        ));
    }

    PolicyDocument {
        version: "2012-10-17",
        statement: statements,
    }
}

/// Trust policy letting the gateway service assume the role, pinned to
/// the deploying account
pub fn trust_policy(account: &str) -> serde_json::Value {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "Service": "bedrock-agentcore.amazonaws.com" },
                "Action": "sts:AssumeRole",
                "Condition": {
                    "StringEquals": { "aws:SourceAccount": account }
                }
            }
        ]
    })
}

pub struct ExecutionRoleManager {
    cp: Arc<dyn ControlPlane>,
}

impl ExecutionRoleManager {
    pub fn new(cp: Arc<dyn ControlPlane>) -> Self {
        Self { cp }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRoleSpec {
    pub role_name: String,
    pub inputs: PolicyInputs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRoleState {
    pub role_name: String,
    pub arn: String,
}

#[async_trait]
impl Provisionable for ExecutionRoleManager {
    type Params = ExecutionRoleSpec;
    type State = ExecutionRoleState;

    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    fn physical_id(&self, state: &Self::State) -> String {
        state.arn.clone()
    }

    async fn create(
        &self,
        _ctx: &ResourceContext<'_>,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        let trust = trust_policy(&spec.inputs.account);
        let role = self.cp.create_role(&spec.role_name, &trust).await?;

        let policy = serde_json::to_value(execution_policy(&spec.inputs))?;
        self.cp
            .put_role_policy(&spec.role_name, POLICY_NAME, &policy)
            .await?;

        Ok(ExecutionRoleState {
            role_name: role.role_name,
            arn: role.arn,
        })
    }

    async fn update(
        &self,
        _ctx: &ResourceContext<'_>,
        state: &Self::State,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        // Inline policies are idempotent puts; the role itself never changes
        let policy = serde_json::to_value(execution_policy(&spec.inputs))?;
        self.cp
            .put_role_policy(&state.role_name, POLICY_NAME, &policy)
            .await?;
        Ok(state.clone())
    }

    async fn delete(&self, state: &Self::State) -> ResourceResult<()> {
        self.cp
            .delete_role_policy(&state.role_name, POLICY_NAME)
            .await?;
        self.cp.delete_role(&state.role_name).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> PolicyInputs {
        PolicyInputs {
            account: "123456789012".to_string(),
            region: "us-east-1".to_string(),
            bucket_arns: vec![],
            function_arns: vec![],
            semantic_search: false,
        }
    }

    fn sids(doc: &PolicyDocument) -> Vec<&str> {
        doc.statement.iter().map(|s| s.sid.as_str()).collect()
    }

    #[test]
    fn test_minimal_policy_has_only_observability_grants() {
        let doc = execution_policy(&base_inputs());
        assert_eq!(sids(&doc), vec!["GatewayLogs", "GatewayTracing", "GatewayMetrics"]);
        assert_eq!(
            doc.statement[0].resource[0],
            "arn:aws:logs:us-east-1:123456789012:log-group:/aws/bedrock-agentcore/gateways/*"
        );
    }

    #[test]
    fn test_bucket_grant_targets_objects() {
        let mut inputs = base_inputs();
        inputs.bucket_arns = vec!["arn:aws:s3:::demo-schemas".to_string()];
        let doc = execution_policy(&inputs);

        let read = doc.statement.iter().find(|s| s.sid == "SchemaRead").unwrap();
        assert_eq!(read.resource, vec!["arn:aws:s3:::demo-schemas/*"]);
    }

    #[test]
    fn test_semantic_search_adds_sync_grant() {
        let mut inputs = base_inputs();
        inputs.semantic_search = true;
        let doc = execution_policy(&inputs);
        assert!(sids(&doc).contains(&"TargetSync"));
    }

    #[test]
    fn test_metrics_grant_is_namespace_conditioned() {
        let doc = execution_policy(&base_inputs());
        let metrics = doc.statement.iter().find(|s| s.sid == "GatewayMetrics").unwrap();
        let condition = metrics.condition.as_ref().unwrap();
        assert_eq!(
            condition["StringEquals"]["cloudwatch:namespace"],
            "bedrock-agentcore"
        );
    }

    #[test]
    fn test_trust_policy_pins_source_account() {
        let trust = trust_policy("123456789012");
        let statement = &trust["Statement"][0];
        assert_eq!(
            statement["Principal"]["Service"],
            "bedrock-agentcore.amazonaws.com"
        );
        assert_eq!(
            statement["Condition"]["StringEquals"]["aws:SourceAccount"],
            "123456789012"
        );
    }
}
