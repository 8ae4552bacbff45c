//! Control-plane seam
//!
//! Every external create/update/delete the stack issues goes through this
//! trait, so tests can substitute a recording implementation and assert
//! that fail-fast paths never reach the network.

use crate::error::Result;
use crate::types::*;
use async_trait::async_trait;

#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Check that credentials are usable before touching anything
    async fn check_auth(&self) -> Result<AuthStatus>;

    // ========== Gateway ==========

    async fn create_gateway(&self, params: &GatewayParams) -> Result<Gateway>;
    async fn update_gateway(&self, gateway_id: &str, params: &GatewayParams) -> Result<Gateway>;
    async fn delete_gateway(&self, gateway_id: &str) -> Result<()>;

    // ========== Gateway targets ==========

    async fn create_gateway_target(&self, params: &GatewayTargetParams) -> Result<GatewayTarget>;
    async fn update_gateway_target(
        &self,
        target_id: &str,
        params: &GatewayTargetParams,
    ) -> Result<GatewayTarget>;
    async fn delete_gateway_target(&self, gateway_id: &str, target_id: &str) -> Result<()>;

    // ========== Credential providers ==========

    async fn create_api_key_credential_provider(
        &self,
        name: &str,
        api_key: &str,
    ) -> Result<CredentialProviderHandle>;
    async fn delete_api_key_credential_provider(&self, name: &str) -> Result<()>;

    // ========== Secrets ==========

    async fn create_secret(&self, name: &str, value: &str) -> Result<Secret>;
    async fn put_secret_value(&self, name: &str, value: &str) -> Result<()>;
    async fn delete_secret(&self, name: &str) -> Result<()>;

    // ========== Object store ==========

    async fn create_bucket(&self, bucket: &str) -> Result<()>;
    async fn put_bucket_policy(&self, bucket: &str, policy: &serde_json::Value) -> Result<()>;
    async fn put_object(&self, bucket: &str, key: &str, body: &str) -> Result<()>;
    /// Remove every object; schema documents are derived artifacts
    async fn purge_bucket(&self, bucket: &str) -> Result<()>;
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    // ========== Identity pool ==========

    async fn create_user_pool(&self, name: &str) -> Result<UserPool>;
    async fn create_resource_server(
        &self,
        pool_id: &str,
        identifier: &str,
        scopes: &[(String, String)],
    ) -> Result<()>;
    async fn create_user_pool_client(
        &self,
        pool_id: &str,
        name: &str,
        allowed_scopes: &[String],
    ) -> Result<UserPoolClient>;
    async fn create_user_pool_domain(&self, pool_id: &str, domain: &str) -> Result<()>;
    async fn delete_user_pool_domain(&self, pool_id: &str, domain: &str) -> Result<()>;
    async fn delete_user_pool(&self, pool_id: &str) -> Result<()>;

    // ========== Execution role ==========

    async fn create_role(&self, name: &str, assume_role_policy: &serde_json::Value)
        -> Result<Role>;
    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy: &serde_json::Value,
    ) -> Result<()>;
    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> Result<()>;
    async fn delete_role(&self, role_name: &str) -> Result<()>;
}
