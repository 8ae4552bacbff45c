//! Recording control-plane stub shared by the stack tests

use async_trait::async_trait;
use gateflow_controlplane::{
    AuthStatus, ControlPlane, CredentialProviderHandle, Gateway, GatewayParams, GatewayTarget,
    GatewayTargetParams, Result, Role, Secret, UserPool, UserPoolClient,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Records every call in order and answers with canned responses
#[derive(Clone)]
pub struct MockControlPlane {
    calls: Arc<Mutex<Vec<String>>>,
    objects: Arc<Mutex<HashMap<String, String>>>,
    /// When false, provider creation omits the ARN from its response
    return_provider_arn: bool,
}

impl MockControlPlane {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            objects: Arc::new(Mutex::new(HashMap::new())),
            return_provider_arn: true,
        }
    }

    pub fn without_provider_arn() -> Self {
        Self {
            return_provider_arn: false,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects.lock().unwrap().get(&format!("{bucket}/{key}")).cloned()
    }

    fn record(&self, entry: impl Into<String>) {
        self.calls.lock().unwrap().push(entry.into());
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn check_auth(&self) -> Result<AuthStatus> {
        self.record("check_auth");
        Ok(AuthStatus::ok("123456789012"))
    }

    async fn create_gateway(&self, params: &GatewayParams) -> Result<Gateway> {
        self.record(format!("create_gateway:{}", params.name));
        Ok(Gateway {
            gateway_id: "GW-TEST".to_string(),
            gateway_arn: "arn:aws:bedrock-agentcore:us-east-1:123456789012:gateway/GW-TEST"
                .to_string(),
            gateway_url: "https://gw-test.gateway.bedrock-agentcore.us-east-1.amazonaws.com/mcp"
                .to_string(),
            status: Some("READY".to_string()),
        })
    }

    async fn update_gateway(&self, gateway_id: &str, params: &GatewayParams) -> Result<Gateway> {
        self.record(format!("update_gateway:{gateway_id}"));
        Ok(Gateway {
            gateway_id: gateway_id.to_string(),
            gateway_arn: format!(
                "arn:aws:bedrock-agentcore:us-east-1:123456789012:gateway/{gateway_id}"
            ),
            gateway_url: format!("https://{}.example.com/mcp", params.name),
            status: Some("READY".to_string()),
        })
    }

    async fn delete_gateway(&self, gateway_id: &str) -> Result<()> {
        self.record(format!("delete_gateway:{gateway_id}"));
        Ok(())
    }

    async fn create_gateway_target(&self, params: &GatewayTargetParams) -> Result<GatewayTarget> {
        self.record(format!("create_gateway_target:{}", params.name));
        Ok(GatewayTarget {
            target_id: format!("TGT-{}", params.name),
            status: Some("READY".to_string()),
        })
    }

    async fn update_gateway_target(
        &self,
        target_id: &str,
        _params: &GatewayTargetParams,
    ) -> Result<GatewayTarget> {
        self.record(format!("update_gateway_target:{target_id}"));
        Ok(GatewayTarget {
            target_id: target_id.to_string(),
            status: Some("READY".to_string()),
        })
    }

    async fn delete_gateway_target(&self, gateway_id: &str, target_id: &str) -> Result<()> {
        self.record(format!("delete_gateway_target:{gateway_id}/{target_id}"));
        Ok(())
    }

    async fn create_api_key_credential_provider(
        &self,
        name: &str,
        _api_key: &str,
    ) -> Result<CredentialProviderHandle> {
        self.record(format!("create_credential_provider:{name}"));
        let arn = self.return_provider_arn.then(|| {
            format!(
                "arn:aws:bedrock-agentcore:us-east-1:123456789012:token-vault/default/apikeycredentialprovider/{name}"
            )
        });
        Ok(CredentialProviderHandle {
            name: name.to_string(),
            credential_provider_arn: arn,
        })
    }

    async fn delete_api_key_credential_provider(&self, name: &str) -> Result<()> {
        self.record(format!("delete_credential_provider:{name}"));
        Ok(())
    }

    async fn create_secret(&self, name: &str, _value: &str) -> Result<Secret> {
        self.record(format!("create_secret:{name}"));
        Ok(Secret {
            arn: format!("arn:aws:secretsmanager:us-east-1:123456789012:secret:{name}"),
            name: name.to_string(),
        })
    }

    async fn put_secret_value(&self, name: &str, _value: &str) -> Result<()> {
        self.record(format!("put_secret_value:{name}"));
        Ok(())
    }

    async fn delete_secret(&self, name: &str) -> Result<()> {
        self.record(format!("delete_secret:{name}"));
        Ok(())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.record(format!("create_bucket:{bucket}"));
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, _policy: &serde_json::Value) -> Result<()> {
        self.record(format!("put_bucket_policy:{bucket}"));
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: &str) -> Result<()> {
        self.record(format!("put_object:{bucket}/{key}"));
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{bucket}/{key}"), body.to_string());
        Ok(())
    }

    async fn purge_bucket(&self, bucket: &str) -> Result<()> {
        self.record(format!("purge_bucket:{bucket}"));
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.record(format!("delete_bucket:{bucket}"));
        Ok(())
    }

    async fn create_user_pool(&self, name: &str) -> Result<UserPool> {
        self.record(format!("create_user_pool:{name}"));
        Ok(UserPool {
            id: "us-east-1_TEST".to_string(),
        })
    }

    async fn create_resource_server(
        &self,
        pool_id: &str,
        identifier: &str,
        _scopes: &[(String, String)],
    ) -> Result<()> {
        self.record(format!("create_resource_server:{pool_id}/{identifier}"));
        Ok(())
    }

    async fn create_user_pool_client(
        &self,
        pool_id: &str,
        name: &str,
        _allowed_scopes: &[String],
    ) -> Result<UserPoolClient> {
        self.record(format!("create_user_pool_client:{pool_id}/{name}"));
        Ok(UserPoolClient {
            client_id: "client-TEST".to_string(),
        })
    }

    async fn create_user_pool_domain(&self, pool_id: &str, domain: &str) -> Result<()> {
        self.record(format!("create_user_pool_domain:{pool_id}/{domain}"));
        Ok(())
    }

    async fn delete_user_pool_domain(&self, pool_id: &str, domain: &str) -> Result<()> {
        self.record(format!("delete_user_pool_domain:{pool_id}/{domain}"));
        Ok(())
    }

    async fn delete_user_pool(&self, pool_id: &str) -> Result<()> {
        self.record(format!("delete_user_pool:{pool_id}"));
        Ok(())
    }

    async fn create_role(
        &self,
        name: &str,
        _assume_role_policy: &serde_json::Value,
    ) -> Result<Role> {
        self.record(format!("create_role:{name}"));
        Ok(Role {
            role_name: name.to_string(),
            arn: format!("arn:aws:iam::123456789012:role/{name}"),
        })
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        _policy: &serde_json::Value,
    ) -> Result<()> {
        self.record(format!("put_role_policy:{role_name}/{policy_name}"));
        Ok(())
    }

    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> Result<()> {
        self.record(format!("delete_role_policy:{role_name}/{policy_name}"));
        Ok(())
    }

    async fn delete_role(&self, role_name: &str) -> Result<()> {
        self.record(format!("delete_role:{role_name}"));
        Ok(())
    }
}
