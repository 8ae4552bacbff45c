//! Per-integration resources: secret, credential provider, gateway target
//!
//! Each integration gets an audit-trail secret holding its API key, a
//! credential provider the gateway pulls the key from at call time, and
//! the target wiring the schema document to the gateway.

use async_trait::async_trait;
use gateflow_controlplane::{
    ApiKeyCredentialProvider, ControlPlane, CredentialLocation,
    CredentialProviderConfiguration, CredentialProviderDetails, GatewayTargetParams,
    ApiSchemaConfiguration, McpTargetConfiguration, S3SchemaLocation, TargetConfiguration,
};
use gateflow_core::StorageLocation;
use gateflow_provision::{Provisionable, ResourceContext, ResourceResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SECRET_RESOURCE_TYPE: &str = "secret";
pub const PROVIDER_RESOURCE_TYPE: &str = "credential-provider";
pub const TARGET_RESOURCE_TYPE: &str = "gateway-target";

// ========== Secret ==========

pub struct SecretManager {
    cp: Arc<dyn ControlPlane>,
}

impl SecretManager {
    pub fn new(cp: Arc<dyn ControlPlane>) -> Self {
        Self { cp }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SecretSpec {
    pub name: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretState {
    pub name: String,
    pub arn: String,
}

#[async_trait]
impl Provisionable for SecretManager {
    type Params = SecretSpec;
    type State = SecretState;

    fn resource_type(&self) -> &str {
        SECRET_RESOURCE_TYPE
    }

    fn physical_id(&self, state: &Self::State) -> String {
        state.arn.clone()
    }

    async fn create(
        &self,
        _ctx: &ResourceContext<'_>,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        let secret = self.cp.create_secret(&spec.name, &spec.api_key).await?;
        Ok(SecretState {
            name: secret.name,
            arn: secret.arn,
        })
    }

    async fn update(
        &self,
        _ctx: &ResourceContext<'_>,
        state: &Self::State,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        // Rotating the key in config pushes a new secret version
        self.cp.put_secret_value(&state.name, &spec.api_key).await?;
        Ok(state.clone())
    }

    async fn delete(&self, state: &Self::State) -> ResourceResult<()> {
        self.cp.delete_secret(&state.name).await?;
        Ok(())
    }
}

// ========== Credential provider ==========

pub struct CredentialProviderManager {
    cp: Arc<dyn ControlPlane>,
}

impl CredentialProviderManager {
    pub fn new(cp: Arc<dyn ControlPlane>) -> Self {
        Self { cp }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialProviderSpec {
    pub name: String,
    pub api_key: String,
    pub region: String,
    pub account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialProviderState {
    pub name: String,
    pub arn: String,
}

/// Provider ARN as the token vault conventionally issues it, used when the
/// control plane does not echo the ARN back
pub fn conventional_provider_arn(region: &str, account: &str, name: &str) -> String {
    format!(
        "arn:aws:bedrock-agentcore:{region}:{account}:token-vault/default/apikeycredentialprovider/{name}"
    )
}

#[async_trait]
impl Provisionable for CredentialProviderManager {
    type Params = CredentialProviderSpec;
    type State = CredentialProviderState;

    fn resource_type(&self) -> &str {
        PROVIDER_RESOURCE_TYPE
    }

    fn physical_id(&self, state: &Self::State) -> String {
        state.arn.clone()
    }

    async fn create(
        &self,
        _ctx: &ResourceContext<'_>,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        let handle = self
            .cp
            .create_api_key_credential_provider(&spec.name, &spec.api_key)
            .await?;

        let arn = handle.credential_provider_arn.unwrap_or_else(|| {
            tracing::warn!(
                provider = %spec.name,
                "control plane returned no provider ARN, falling back to the conventional form"
            );
            conventional_provider_arn(&spec.region, &spec.account, &spec.name)
        });

        Ok(CredentialProviderState {
            name: handle.name,
            arn,
        })
    }

    async fn update(
        &self,
        ctx: &ResourceContext<'_>,
        state: &Self::State,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        // Providers have no update call; replace in place under the same name
        self.cp
            .delete_api_key_credential_provider(&state.name)
            .await?;
        self.create(ctx, spec).await
    }

    async fn delete(&self, state: &Self::State) -> ResourceResult<()> {
        self.cp
            .delete_api_key_credential_provider(&state.name)
            .await?;
        Ok(())
    }
}

// ========== Gateway target ==========

pub struct TargetManager {
    cp: Arc<dyn ControlPlane>,
}

impl TargetManager {
    pub fn new(cp: Arc<dyn ControlPlane>) -> Self {
        Self { cp }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetSpec {
    pub name: String,
    pub description: Option<String>,
    /// Graph key of the gateway node
    pub gateway_key: String,
    /// Graph key of this integration's credential provider node
    pub provider_key: String,
    pub schema_location: StorageLocation,
    /// Rendered schema body to upload before target creation; `None` for
    /// prebuilt schemas that already live in their bucket
    pub schema_document: Option<String>,
    pub credential_location: CredentialLocation,
    pub parameter_name: String,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetState {
    pub target_id: String,
    pub gateway_id: String,
    pub name: String,
}

impl TargetManager {
    fn request(
        ctx: &ResourceContext<'_>,
        spec: &TargetSpec,
    ) -> ResourceResult<GatewayTargetParams> {
        let gateway_id = ctx.physical_id(&spec.gateway_key)?;
        let provider: CredentialProviderState = ctx.state_of(&spec.provider_key)?;

        Ok(GatewayTargetParams {
            gateway_identifier: gateway_id,
            name: spec.name.clone(),
            description: spec.description.clone(),
            target_configuration: TargetConfiguration {
                mcp: McpTargetConfiguration {
                    open_api_schema: ApiSchemaConfiguration {
                        s3: S3SchemaLocation {
                            uri: spec.schema_location.uri(),
                        },
                    },
                },
            },
            credential_provider_configurations: vec![CredentialProviderConfiguration {
                credential_provider_type: "API_KEY".to_string(),
                credential_provider: CredentialProviderDetails {
                    api_key_credential_provider: ApiKeyCredentialProvider {
                        provider_arn: provider.arn,
                        credential_location: spec.credential_location,
                        credential_parameter_name: Some(spec.parameter_name.clone()),
                        credential_prefix: spec.prefix.clone(),
                    },
                },
            }],
        })
    }

    async fn upload_schema(&self, spec: &TargetSpec) -> ResourceResult<()> {
        if let Some(body) = &spec.schema_document {
            self.cp
                .put_object(
                    &spec.schema_location.bucket,
                    &spec.schema_location.key,
                    body,
                )
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Provisionable for TargetManager {
    type Params = TargetSpec;
    type State = TargetState;

    fn resource_type(&self) -> &str {
        TARGET_RESOURCE_TYPE
    }

    fn physical_id(&self, state: &Self::State) -> String {
        state.target_id.clone()
    }

    async fn create(
        &self,
        ctx: &ResourceContext<'_>,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        self.upload_schema(spec).await?;
        let params = Self::request(ctx, spec)?;
        let gateway_id = params.gateway_identifier.clone();
        let target = self.cp.create_gateway_target(&params).await?;

        Ok(TargetState {
            target_id: target.target_id,
            gateway_id,
            name: spec.name.clone(),
        })
    }

    async fn update(
        &self,
        ctx: &ResourceContext<'_>,
        state: &Self::State,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        self.upload_schema(spec).await?;
        let params = Self::request(ctx, spec)?;
        let gateway_id = params.gateway_identifier.clone();
        let target = self
            .cp
            .update_gateway_target(&state.target_id, &params)
            .await?;

        Ok(TargetState {
            target_id: target.target_id,
            gateway_id,
            name: spec.name.clone(),
        })
    }

    async fn delete(&self, state: &Self::State) -> ResourceResult<()> {
        self.cp
            .delete_gateway_target(&state.gateway_id, &state.target_id)
            .await?;
        Ok(())
    }
}
