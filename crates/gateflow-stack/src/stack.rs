//! Deployment stack assembly
//!
//! Turns a validated deployment config into a resource graph: execution
//! role, optional identity pool, optional schema bucket, the gateway, and
//! a secret/credential-provider/target triple per enabled integration.
//! Custom schema templates are rendered here, before the engine runs, so a
//! missing template or placeholder never leaves half a stack behind.

use gateflow_controlplane::{ControlPlane, CredentialLocation};
use gateflow_core::{
    AuthenticationType, DeployConfig, IntegrationTargetConfig, SchemaTemplates,
    StorageLocation, deterministic_id,
};
use gateflow_provision::{
    ApplyResult, Engine, GlobalState, Plan, ResourceNode, TypeDeleter,
};
use std::path::Path;
use std::sync::Arc;

use crate::bucket::{SchemaBucketManager, SchemaBucketSpec};
use crate::error::Result;
use crate::gateway::{GatewayManager, GatewaySpec};
use crate::identity::{IdentityBinder, IdentitySpec};
use crate::role::{ExecutionRoleManager, ExecutionRoleSpec, PolicyInputs};
use crate::target::{
    CredentialProviderManager, CredentialProviderSpec, SecretManager, SecretSpec,
    TargetManager, TargetSpec,
};
use crate::{bucket, gateway, identity, role, target};

/// Graph keys for the singleton nodes
pub const KEY_BUCKET: &str = "schema-bucket";
pub const KEY_IDENTITY: &str = "identity";
pub const KEY_ROLE: &str = "execution-role";
pub const KEY_GATEWAY: &str = "gateway";

pub struct GatewayStack {
    config: DeployConfig,
    cp: Arc<dyn ControlPlane>,
    templates: SchemaTemplates,
}

/// Logical keys for one integration's resources
pub fn target_keys(target_type: &str) -> (String, String, String) {
    let t = sanitized(target_type);
    (
        format!("secret-{t}"),
        format!("credential-provider-{t}"),
        format!("target-{t}"),
    )
}

/// Control-plane names reject dots, which pre-built type keys carry
fn sanitized(target_type: &str) -> String {
    target_type.replace('.', "-")
}

impl GatewayStack {
    /// Validates the config up front; an invalid document never produces a
    /// stack instance
    pub fn new(
        config: DeployConfig,
        cp: Arc<dyn ControlPlane>,
        schema_dir: impl AsRef<Path>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cp,
            templates: SchemaTemplates::new(schema_dir),
        })
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    fn uses_jwt(&self) -> bool {
        self.config.gateway.authentication_type == AuthenticationType::Jwt
    }

    fn has_custom_targets(&self) -> bool {
        self.config.enabled_targets().any(|t| !t.is_prebuilt())
    }

    /// Deterministic bucket name, namespaced by stack
    pub fn schema_bucket_name(&self) -> String {
        format!(
            "{}-schemas-{}",
            self.config.stack_name.to_lowercase(),
            deterministic_id(&format!("{}/schemas", self.config.stack_name))
        )
    }

    fn execution_role_name(&self) -> String {
        format!(
            "{}-gateway-execution-{}",
            self.config.stack_name,
            deterministic_id(&format!("{}/execution-role", self.config.stack_name))
        )
    }

    /// Secret name carries a digest so parallel stacks in one account
    /// never collide
    pub fn secret_name(&self, target_type: &str) -> String {
        format!(
            "{}-apikey-{}",
            sanitized(target_type),
            deterministic_id(&format!("{}/{}", self.config.stack_name, target_type))
        )
    }

    fn provider_name(&self, target_type: &str) -> String {
        format!(
            "{}-apikey-provider-{}",
            sanitized(target_type),
            deterministic_id(&format!("{}/{}", self.config.stack_name, target_type))
        )
    }

    /// Where a target's schema document lives once deployed
    fn schema_location(&self, target: &IntegrationTargetConfig) -> Result<StorageLocation> {
        let bucket = if target.is_prebuilt() {
            self.config
                .gateway
                .agent_core_schemas_bucket
                .clone()
                .unwrap_or_default()
        } else {
            self.schema_bucket_name()
        };

        let uri = format!("s3://{}/{}", bucket, target.schema_file_name());
        Ok(uri.parse::<StorageLocation>()?)
    }

    /// Render the schema document for a custom target; pre-built targets
    /// have nothing to render
    fn schema_document(&self, target: &IntegrationTargetConfig) -> Result<Option<String>> {
        if target.is_prebuilt() {
            return Ok(None);
        }
        let base_url = target.config.base_url.as_deref().ok_or_else(|| {
            gateflow_core::CoreError::MissingSubstitutionValue(target.target_type.clone())
        })?;
        let rendered = self.templates.materialize(target.short_type(), base_url)?;
        Ok(Some(rendered))
    }

    /// Build the resource graph. Every schema template renders here, so
    /// this fails before any control-plane call when one is broken.
    pub fn engine(&self) -> Result<Engine> {
        let mut engine = Engine::new();
        let aws = &self.config.aws;

        let has_bucket = self.has_custom_targets();
        let mut bucket_arns = Vec::new();

        if has_bucket {
            let bucket_name = self.schema_bucket_name();
            bucket_arns.push(format!("arn:aws:s3:::{bucket_name}"));
            engine.add_node(Box::new(ResourceNode::new(
                KEY_BUCKET,
                SchemaBucketManager::new(self.cp.clone()),
                SchemaBucketSpec {
                    bucket_name,
                    source_account: aws.account.clone(),
                },
            )));
        }

        for t in self.config.enabled_targets().filter(|t| t.is_prebuilt()) {
            bucket_arns.push(self.schema_location(t)?.bucket_arn());
        }
        bucket_arns.sort();
        bucket_arns.dedup();

        engine.add_node(Box::new(ResourceNode::new(
            KEY_ROLE,
            ExecutionRoleManager::new(self.cp.clone()),
            ExecutionRoleSpec {
                role_name: self.execution_role_name(),
                inputs: PolicyInputs {
                    account: aws.account.clone(),
                    region: aws.region.clone(),
                    bucket_arns,
                    function_arns: Vec::new(),
                    semantic_search: self.config.gateway.enable_semantic_search,
                },
            },
        )));

        if self.uses_jwt() {
            engine.add_node(Box::new(ResourceNode::new(
                KEY_IDENTITY,
                IdentityBinder::new(self.cp.clone(), aws.region.clone()),
                IdentitySpec {
                    stack_name: self.config.stack_name.clone(),
                },
            )));
        }

        let mut gateway_deps = vec![KEY_ROLE];
        if self.uses_jwt() {
            gateway_deps.push(KEY_IDENTITY);
        }
        engine.add_node(Box::new(
            ResourceNode::new(
                KEY_GATEWAY,
                GatewayManager::new(self.cp.clone()),
                GatewaySpec {
                    name: self.config.gateway.name.clone(),
                    description: self.config.gateway.description.clone(),
                    authentication_type: self.config.gateway.authentication_type,
                    semantic_search: self.config.gateway.enable_semantic_search,
                    instructions: self.config.gateway.instructions.clone(),
                    exception_level: self.config.gateway.exception_level.clone(),
                    role_key: KEY_ROLE.to_string(),
                    identity_key: self.uses_jwt().then(|| KEY_IDENTITY.to_string()),
                },
            )
            .depends_on(&gateway_deps),
        ));

        for t in self.config.enabled_targets() {
            let (secret_key, provider_key, target_key) = target_keys(&t.target_type);

            engine.add_node(Box::new(ResourceNode::new(
                secret_key.clone(),
                SecretManager::new(self.cp.clone()),
                SecretSpec {
                    name: self.secret_name(&t.target_type),
                    api_key: t.config.api_key.clone(),
                },
            )));

            engine.add_node(Box::new(
                ResourceNode::new(
                    provider_key.clone(),
                    CredentialProviderManager::new(self.cp.clone()),
                    CredentialProviderSpec {
                        name: self.provider_name(&t.target_type),
                        api_key: t.config.api_key.clone(),
                        region: aws.region.clone(),
                        account: aws.account.clone(),
                    },
                )
                .depends_on(&[&secret_key]),
            ));

            let mut target_deps = vec![
                secret_key.as_str(),
                provider_key.as_str(),
                KEY_GATEWAY,
            ];
            if !t.is_prebuilt() {
                target_deps.push(KEY_BUCKET);
            }

            engine.add_node(Box::new(
                ResourceNode::new(
                    target_key,
                    TargetManager::new(self.cp.clone()),
                    TargetSpec {
                        name: format!("{}-target", sanitized(&t.target_type)),
                        description: Some(format!(
                            "Gateway target for {}",
                            t.target_type
                        )),
                        gateway_key: KEY_GATEWAY.to_string(),
                        provider_key: provider_key.clone(),
                        schema_location: self.schema_location(t)?,
                        schema_document: self.schema_document(t)?,
                        credential_location: CredentialLocation::Header,
                        parameter_name: t.auth_parameter_name().to_string(),
                        prefix: Some(t.auth_prefix().to_string()),
                    },
                )
                .depends_on(&target_deps),
            ));
        }

        self.register_deleters(&mut engine);
        Ok(engine)
    }

    /// Every resource type gets a deleter so records orphaned by config
    /// edits (a removed target, a switch to ambient-credential auth) can
    /// still be torn down
    fn register_deleters(&self, engine: &mut Engine) {
        let region = self.config.aws.region.clone();
        engine.register_deleter(
            bucket::RESOURCE_TYPE,
            Box::new(TypeDeleter::new(SchemaBucketManager::new(self.cp.clone()))),
        );
        engine.register_deleter(
            identity::RESOURCE_TYPE,
            Box::new(TypeDeleter::new(IdentityBinder::new(
                self.cp.clone(),
                region,
            ))),
        );
        engine.register_deleter(
            role::RESOURCE_TYPE,
            Box::new(TypeDeleter::new(ExecutionRoleManager::new(self.cp.clone()))),
        );
        engine.register_deleter(
            gateway::RESOURCE_TYPE,
            Box::new(TypeDeleter::new(GatewayManager::new(self.cp.clone()))),
        );
        engine.register_deleter(
            target::SECRET_RESOURCE_TYPE,
            Box::new(TypeDeleter::new(SecretManager::new(self.cp.clone()))),
        );
        engine.register_deleter(
            target::PROVIDER_RESOURCE_TYPE,
            Box::new(TypeDeleter::new(CredentialProviderManager::new(
                self.cp.clone(),
            ))),
        );
        engine.register_deleter(
            target::TARGET_RESOURCE_TYPE,
            Box::new(TypeDeleter::new(TargetManager::new(self.cp.clone()))),
        );
    }

    pub fn plan(&self, state: &GlobalState) -> Result<Plan> {
        Ok(self.engine()?.plan(state)?)
    }

    pub async fn deploy(&self, state: &mut GlobalState) -> Result<ApplyResult> {
        let engine = self.engine()?;
        let plan = engine.plan(state)?;
        Ok(engine.apply(&plan, state).await?)
    }

    pub async fn destroy(&self, state: &mut GlobalState) -> Result<ApplyResult> {
        Ok(self.engine()?.destroy(state).await?)
    }
}
