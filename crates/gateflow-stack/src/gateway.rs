//! Gateway lifecycle manager
//!
//! Builds the protocol-translation gateway itself. The request body is
//! assembled at apply time because the execution role ARN and (in JWT
//! mode) the identity pool discovery URL only exist once their nodes have
//! been applied.

use async_trait::async_trait;
use gateflow_controlplane::{
    ControlPlane, GatewayParams, McpConfiguration, ProtocolConfiguration,
};
use gateflow_core::AuthenticationType;
use gateflow_provision::{Provisionable, ResourceContext, ResourceResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::identity::{AuthBinding, IdentityState};
use crate::role::ExecutionRoleState;

pub const RESOURCE_TYPE: &str = "gateway";

/// Only MCP revision the gateway advertises
pub const MCP_PROTOCOL_VERSION: &str = "2025-03-26";

pub struct GatewayManager {
    cp: Arc<dyn ControlPlane>,
}

impl GatewayManager {
    pub fn new(cp: Arc<dyn ControlPlane>) -> Self {
        Self { cp }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewaySpec {
    pub name: String,
    pub description: Option<String>,
    pub authentication_type: AuthenticationType,
    pub semantic_search: bool,
    pub instructions: Option<String>,
    pub exception_level: Option<String>,
    /// Graph key of the execution role node
    pub role_key: String,
    /// Graph key of the identity node; set exactly in JWT mode
    pub identity_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayState {
    pub gateway_id: String,
    pub gateway_arn: String,
    pub gateway_url: String,
    /// Discovery URL of the token issuer, absent in IAM mode
    pub discovery_url: Option<String>,
}

impl GatewayManager {
    fn request(
        ctx: &ResourceContext<'_>,
        spec: &GatewaySpec,
    ) -> ResourceResult<(GatewayParams, Option<String>)> {
        let role: ExecutionRoleState = ctx.state_of(&spec.role_key)?;

        let binding = match (&spec.authentication_type, &spec.identity_key) {
            (AuthenticationType::Jwt, Some(key)) => {
                let identity: IdentityState = ctx.state_of(key)?;
                identity.binding()
            }
            _ => AuthBinding::Iam,
        };

        let discovery_url = match &binding {
            AuthBinding::Jwt { discovery_url, .. } => Some(discovery_url.clone()),
            AuthBinding::Iam => None,
        };

        let params = GatewayParams {
            name: spec.name.clone(),
            description: spec.description.clone(),
            role_arn: role.arn,
            protocol_type: "MCP".to_string(),
            protocol_configuration: ProtocolConfiguration {
                mcp: McpConfiguration {
                    supported_versions: vec![MCP_PROTOCOL_VERSION.to_string()],
                    search_type: spec.semantic_search.then(|| "SEMANTIC".to_string()),
                    instructions: spec.instructions.clone(),
                },
            },
            authorizer_type: binding.authorizer_type().to_string(),
            authorizer_configuration: binding.authorizer_configuration(),
            exception_level: spec.exception_level.clone(),
        };

        Ok((params, discovery_url))
    }
}

#[async_trait]
impl Provisionable for GatewayManager {
    type Params = GatewaySpec;
    type State = GatewayState;

    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    fn physical_id(&self, state: &Self::State) -> String {
        state.gateway_id.clone()
    }

    async fn create(
        &self,
        ctx: &ResourceContext<'_>,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        let (params, discovery_url) = Self::request(ctx, spec)?;
        let gateway = self.cp.create_gateway(&params).await?;

        Ok(GatewayState {
            gateway_id: gateway.gateway_id,
            gateway_arn: gateway.gateway_arn,
            gateway_url: gateway.gateway_url,
            discovery_url,
        })
    }

    async fn update(
        &self,
        ctx: &ResourceContext<'_>,
        state: &Self::State,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        let (params, discovery_url) = Self::request(ctx, spec)?;
        let gateway = self.cp.update_gateway(&state.gateway_id, &params).await?;

        Ok(GatewayState {
            gateway_id: gateway.gateway_id,
            gateway_arn: gateway.gateway_arn,
            gateway_url: gateway.gateway_url,
            discovery_url,
        })
    }

    async fn delete(&self, state: &Self::State) -> ResourceResult<()> {
        self.cp.delete_gateway(&state.gateway_id).await?;
        Ok(())
    }
}
