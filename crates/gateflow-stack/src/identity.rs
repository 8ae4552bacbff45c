//! Identity/token service binder
//!
//! Exists only in JWT mode: a machine-to-machine identity pool configured
//! for client-credentials flows, one resource server with a read/write
//! scope pair, one allowed client and a hosted domain. IAM mode skips all
//! of this; requests are signed with ambient credentials instead.

use async_trait::async_trait;
use gateflow_controlplane::{
    AuthorizerConfiguration, ControlPlane, CustomJwtAuthorizer,
};
use gateflow_core::deterministic_id;
use gateflow_provision::{Provisionable, ResourceContext, ResourceResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "identity-pool";

/// Resource server identifier scoping issued tokens
const RESOURCE_SERVER_ID: &str = "gateway";

/// Authentication binding computed once per deployment: either a JWT
/// authorizer backed by the identity pool, or ambient-credential signing
/// with nothing to provision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthBinding {
    Jwt {
        discovery_url: String,
        allowed_clients: Vec<String>,
    },
    Iam,
}

impl AuthBinding {
    pub fn authorizer_type(&self) -> &'static str {
        match self {
            AuthBinding::Jwt { .. } => "CUSTOM_JWT",
            AuthBinding::Iam => "AWS_IAM",
        }
    }

    /// The authorizer block attached to the gateway, present only in JWT mode
    pub fn authorizer_configuration(&self) -> Option<AuthorizerConfiguration> {
        match self {
            AuthBinding::Jwt {
                discovery_url,
                allowed_clients,
            } => Some(AuthorizerConfiguration {
                custom_jwt_authorizer: CustomJwtAuthorizer {
                    discovery_url: discovery_url.clone(),
                    allowed_clients: allowed_clients.clone(),
                },
            }),
            AuthBinding::Iam => None,
        }
    }
}

pub struct IdentityBinder {
    cp: Arc<dyn ControlPlane>,
    region: String,
}

impl IdentityBinder {
    pub fn new(cp: Arc<dyn ControlPlane>, region: impl Into<String>) -> Self {
        Self {
            cp,
            region: region.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentitySpec {
    pub stack_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityState {
    pub user_pool_id: String,
    pub client_id: String,
    pub domain: String,
    pub discovery_url: String,
}

impl IdentityState {
    /// The binding consumed by the gateway lifecycle manager
    pub fn binding(&self) -> AuthBinding {
        AuthBinding::Jwt {
            discovery_url: self.discovery_url.clone(),
            allowed_clients: vec![self.client_id.clone()],
        }
    }
}

#[async_trait]
impl Provisionable for IdentityBinder {
    type Params = IdentitySpec;
    type State = IdentityState;

    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    fn physical_id(&self, state: &Self::State) -> String {
        state.user_pool_id.clone()
    }

    async fn create(
        &self,
        _ctx: &ResourceContext<'_>,
        spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        let pool_name = format!("{}-gateway-identity", spec.stack_name);
        let pool = self.cp.create_user_pool(&pool_name).await?;

        let scopes = vec![
            ("read".to_string(), "Read access to gateway tools".to_string()),
            ("write".to_string(), "Write access to gateway tools".to_string()),
        ];
        self.cp
            .create_resource_server(&pool.id, RESOURCE_SERVER_ID, &scopes)
            .await?;

        let allowed_scopes = vec![
            format!("{RESOURCE_SERVER_ID}/read"),
            format!("{RESOURCE_SERVER_ID}/write"),
        ];
        let client = self
            .cp
            .create_user_pool_client(
                &pool.id,
                &format!("{}-m2m-client", spec.stack_name),
                &allowed_scopes,
            )
            .await?;

        // Domains are a global namespace, so the name carries a digest
        let domain = format!(
            "{}-{}",
            spec.stack_name.to_lowercase(),
            deterministic_id(&format!("{}/identity", spec.stack_name))
        );
        self.cp.create_user_pool_domain(&pool.id, &domain).await?;

        let discovery_url = format!(
            "https://cognito-idp.{}.amazonaws.com/{}/.well-known/openid-configuration",
            self.region, pool.id
        );

        Ok(IdentityState {
            user_pool_id: pool.id,
            client_id: client.client_id,
            domain,
            discovery_url,
        })
    }

    async fn update(
        &self,
        _ctx: &ResourceContext<'_>,
        state: &Self::State,
        _spec: &Self::Params,
    ) -> ResourceResult<Self::State> {
        // Pool, client and domain are all derived from the stack name;
        // nothing to push on redeploy
        Ok(state.clone())
    }

    async fn delete(&self, state: &Self::State) -> ResourceResult<()> {
        self.cp
            .delete_user_pool_domain(&state.user_pool_id, &state.domain)
            .await?;
        self.cp.delete_user_pool(&state.user_pool_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_binding_authorizer_block() {
        let state = IdentityState {
            user_pool_id: "us-east-1_Abc".to_string(),
            client_id: "client123".to_string(),
            domain: "demo-abcdef".to_string(),
            discovery_url: "https://example.com/.well-known/openid-configuration".to_string(),
        };

        let binding = state.binding();
        assert_eq!(binding.authorizer_type(), "CUSTOM_JWT");

        let config = binding.authorizer_configuration().unwrap();
        assert_eq!(
            config.custom_jwt_authorizer.discovery_url,
            "https://example.com/.well-known/openid-configuration"
        );
        assert_eq!(config.custom_jwt_authorizer.allowed_clients, vec!["client123"]);
    }

    #[test]
    fn test_iam_binding_has_no_authorizer() {
        let binding = AuthBinding::Iam;
        assert_eq!(binding.authorizer_type(), "AWS_IAM");
        assert!(binding.authorizer_configuration().is_none());
    }
}
