//! Deployment outputs
//!
//! The post-deploy summary a caller needs to start talking to the
//! gateway, assembled from recorded state.

use gateflow_provision::GlobalState;
use serde::{Deserialize, Serialize};

use crate::gateway::GatewayState;
use crate::stack::{KEY_BUCKET, KEY_GATEWAY};
use crate::target::{TARGET_RESOURCE_TYPE, TargetState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackOutputs {
    pub gateway_id: String,
    pub gateway_arn: String,
    pub gateway_url: String,

    /// Token issuer discovery URL, absent in IAM mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_url: Option<String>,

    pub authentication_type: String,

    /// Schema bucket name, absent when every target uses a pre-built schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_bucket: Option<String>,

    pub targets: Vec<TargetOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOutput {
    pub name: String,
    pub target_id: String,
}

impl StackOutputs {
    /// `None` when no gateway has been deployed yet
    pub fn from_state(state: &GlobalState, authentication_type: &str) -> Option<Self> {
        let record = state.get_resource(KEY_GATEWAY)?;
        let gateway: GatewayState = serde_json::from_value(record.state.clone()).ok()?;

        let schema_bucket = state
            .get_resource(KEY_BUCKET)
            .map(|r| r.physical_id.clone());

        let mut targets: Vec<TargetOutput> = state
            .resources
            .values()
            .filter(|r| r.resource_type == TARGET_RESOURCE_TYPE)
            .filter_map(|r| {
                let target: TargetState = serde_json::from_value(r.state.clone()).ok()?;
                Some(TargetOutput {
                    name: target.name,
                    target_id: target.target_id,
                })
            })
            .collect();
        targets.sort_by(|a, b| a.name.cmp(&b.name));

        Some(Self {
            gateway_id: gateway.gateway_id,
            gateway_arn: gateway.gateway_arn,
            gateway_url: gateway.gateway_url,
            discovery_url: gateway.discovery_url,
            authentication_type: authentication_type.to_string(),
            schema_bucket,
            targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateflow_provision::ResourceRecord;

    #[test]
    fn test_outputs_from_state() {
        let mut state = GlobalState::new();
        state.set_resource(
            KEY_GATEWAY.to_string(),
            ResourceRecord::new(
                "GW1",
                "gateway",
                serde_json::json!({
                    "gateway_id": "GW1",
                    "gateway_arn": "arn:aws:bedrock-agentcore:us-east-1:123456789012:gateway/GW1",
                    "gateway_url": "https://gw1.example.com/mcp",
                    "discovery_url": "https://issuer/.well-known/openid-configuration"
                }),
            ),
        );
        state.set_resource(
            "target-jira".to_string(),
            ResourceRecord::new(
                "T1",
                TARGET_RESOURCE_TYPE,
                serde_json::json!({
                    "target_id": "T1",
                    "gateway_id": "GW1",
                    "name": "jira-target"
                }),
            ),
        );

        let outputs = StackOutputs::from_state(&state, "JWT").unwrap();
        assert_eq!(outputs.gateway_id, "GW1");
        assert_eq!(
            outputs.discovery_url.as_deref(),
            Some("https://issuer/.well-known/openid-configuration")
        );
        assert!(outputs.schema_bucket.is_none());
        assert_eq!(outputs.targets.len(), 1);
        assert_eq!(outputs.targets[0].name, "jira-target");
    }

    #[test]
    fn test_no_outputs_before_deploy() {
        let state = GlobalState::new();
        assert!(StackOutputs::from_state(&state, "JWT").is_none());
    }
}
