//! aws CLI wrapper
//!
//! All control-plane calls go through the `aws` CLI as single synchronous
//! round trips. Retry/backoff on transient faults is the CLI's own
//! behavior; this layer only surfaces the fault text unchanged.

use crate::api::ControlPlane;
use crate::error::{ControlPlaneError, Result};
use crate::types::*;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

const AWS_BINARY: &str = "aws";

pub struct AwsCli {
    region: String,
    profile: Option<String>,
    binary: String,
}

impl AwsCli {
    pub fn new(region: impl Into<String>, profile: Option<String>) -> Self {
        Self {
            region: region.into(),
            profile,
            binary: AWS_BINARY.to_string(),
        }
    }

    #[cfg(test)]
    fn with_binary(binary: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
            binary: binary.into(),
        }
    }

    /// Run an aws CLI command and return stdout
    async fn run_command(&self, operation: &str, args: &[String]) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        cmd.arg("--region").arg(&self.region);
        cmd.arg("--output").arg("json");
        if let Some(profile) = &self.profile {
            cmd.arg("--profile").arg(profile);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(operation, "Running: aws {}", args.join(" "));

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ControlPlaneError::AwsCliNotFound
            } else {
                ControlPlaneError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ControlPlaneError::CommandFailed {
                operation: operation.to_string(),
                message: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a command and deserialize its JSON output
    async fn run_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        args: &[String],
    ) -> Result<T> {
        let stdout = self.run_command(operation, args).await?;
        serde_json::from_str(&stdout).map_err(|e| ControlPlaneError::MalformedResponse {
            operation: operation.to_string(),
            message: e.to_string(),
        })
    }

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }
}

#[async_trait]
impl ControlPlane for AwsCli {
    async fn check_auth(&self) -> Result<AuthStatus> {
        // A missing binary surfaces as AwsCliNotFound from run_command
        match self
            .run_json::<serde_json::Value>(
                "GetCallerIdentity",
                &Self::args(&["sts", "get-caller-identity"]),
            )
            .await
        {
            Ok(identity) => {
                let account = identity
                    .get("Account")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                Ok(AuthStatus::ok(account))
            }
            Err(ControlPlaneError::CommandFailed { message, .. }) => {
                Ok(AuthStatus::failed(message))
            }
            Err(e) => Err(e),
        }
    }

    // ========== Gateway ==========

    async fn create_gateway(&self, params: &GatewayParams) -> Result<Gateway> {
        let input = serde_json::to_string(params)?;
        self.run_json(
            "CreateGateway",
            &Self::args(&[
                "bedrock-agentcore-control",
                "create-gateway",
                "--cli-input-json",
                &input,
            ]),
        )
        .await
    }

    async fn update_gateway(&self, gateway_id: &str, params: &GatewayParams) -> Result<Gateway> {
        let mut input = serde_json::to_value(params)?;
        input["gatewayIdentifier"] = serde_json::json!(gateway_id);
        let input = serde_json::to_string(&input)?;
        self.run_json(
            "UpdateGateway",
            &Self::args(&[
                "bedrock-agentcore-control",
                "update-gateway",
                "--cli-input-json",
                &input,
            ]),
        )
        .await
    }

    async fn delete_gateway(&self, gateway_id: &str) -> Result<()> {
        self.run_command(
            "DeleteGateway",
            &Self::args(&[
                "bedrock-agentcore-control",
                "delete-gateway",
                "--gateway-identifier",
                gateway_id,
            ]),
        )
        .await?;
        Ok(())
    }

    // ========== Gateway targets ==========

    async fn create_gateway_target(&self, params: &GatewayTargetParams) -> Result<GatewayTarget> {
        let input = serde_json::to_string(params)?;
        self.run_json(
            "CreateGatewayTarget",
            &Self::args(&[
                "bedrock-agentcore-control",
                "create-gateway-target",
                "--cli-input-json",
                &input,
            ]),
        )
        .await
    }

    async fn update_gateway_target(
        &self,
        target_id: &str,
        params: &GatewayTargetParams,
    ) -> Result<GatewayTarget> {
        let mut input = serde_json::to_value(params)?;
        input["targetId"] = serde_json::json!(target_id);
        let input = serde_json::to_string(&input)?;
        self.run_json(
            "UpdateGatewayTarget",
            &Self::args(&[
                "bedrock-agentcore-control",
                "update-gateway-target",
                "--cli-input-json",
                &input,
            ]),
        )
        .await
    }

    async fn delete_gateway_target(&self, gateway_id: &str, target_id: &str) -> Result<()> {
        self.run_command(
            "DeleteGatewayTarget",
            &Self::args(&[
                "bedrock-agentcore-control",
                "delete-gateway-target",
                "--gateway-identifier",
                gateway_id,
                "--target-id",
                target_id,
            ]),
        )
        .await?;
        Ok(())
    }

    // ========== Credential providers ==========

    async fn create_api_key_credential_provider(
        &self,
        name: &str,
        api_key: &str,
    ) -> Result<CredentialProviderHandle> {
        self.run_json(
            "CreateApiKeyCredentialProvider",
            &Self::args(&[
                "bedrock-agentcore-control",
                "create-api-key-credential-provider",
                "--name",
                name,
                "--api-key",
                api_key,
            ]),
        )
        .await
    }

    async fn delete_api_key_credential_provider(&self, name: &str) -> Result<()> {
        self.run_command(
            "DeleteApiKeyCredentialProvider",
            &Self::args(&[
                "bedrock-agentcore-control",
                "delete-api-key-credential-provider",
                "--name",
                name,
            ]),
        )
        .await?;
        Ok(())
    }

    // ========== Secrets ==========

    async fn create_secret(&self, name: &str, value: &str) -> Result<Secret> {
        self.run_json(
            "CreateSecret",
            &Self::args(&[
                "secretsmanager",
                "create-secret",
                "--name",
                name,
                "--secret-string",
                value,
            ]),
        )
        .await
    }

    async fn put_secret_value(&self, name: &str, value: &str) -> Result<()> {
        self.run_command(
            "PutSecretValue",
            &Self::args(&[
                "secretsmanager",
                "put-secret-value",
                "--secret-id",
                name,
                "--secret-string",
                value,
            ]),
        )
        .await?;
        Ok(())
    }

    async fn delete_secret(&self, name: &str) -> Result<()> {
        self.run_command(
            "DeleteSecret",
            &Self::args(&[
                "secretsmanager",
                "delete-secret",
                "--secret-id",
                name,
                "--force-delete-without-recovery",
            ]),
        )
        .await?;
        Ok(())
    }

    // ========== Object store ==========

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.run_command(
            "CreateBucket",
            &Self::args(&["s3api", "create-bucket", "--bucket", bucket]),
        )
        .await?;
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &serde_json::Value) -> Result<()> {
        let policy = serde_json::to_string(policy)?;
        self.run_command(
            "PutBucketPolicy",
            &Self::args(&[
                "s3api",
                "put-bucket-policy",
                "--bucket",
                bucket,
                "--policy",
                &policy,
            ]),
        )
        .await?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: &str) -> Result<()> {
        // s3api put-object wants a file, so stage the body in a temp path
        let tmp = std::env::temp_dir().join(format!("gateflow-{}.json", std::process::id()));
        tokio::fs::write(&tmp, body).await?;
        let result = self
            .run_command(
                "PutObject",
                &Self::args(&[
                    "s3api",
                    "put-object",
                    "--bucket",
                    bucket,
                    "--key",
                    key,
                    "--body",
                    &tmp.to_string_lossy(),
                ]),
            )
            .await;
        let _ = tokio::fs::remove_file(&tmp).await;
        result?;
        Ok(())
    }

    async fn purge_bucket(&self, bucket: &str) -> Result<()> {
        self.run_command(
            "PurgeBucket",
            &Self::args(&["s3", "rm", &format!("s3://{bucket}"), "--recursive"]),
        )
        .await?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.run_command(
            "DeleteBucket",
            &Self::args(&["s3api", "delete-bucket", "--bucket", bucket]),
        )
        .await?;
        Ok(())
    }

    // ========== Identity pool ==========

    async fn create_user_pool(&self, name: &str) -> Result<UserPool> {
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(rename = "UserPool")]
            user_pool: UserPool,
        }

        let response: Response = self
            .run_json(
                "CreateUserPool",
                &Self::args(&[
                    "cognito-idp",
                    "create-user-pool",
                    "--pool-name",
                    name,
                    // machine-to-machine only, no self sign-up
                    "--admin-create-user-config",
                    "AllowAdminCreateUserOnly=true",
                ]),
            )
            .await?;
        Ok(response.user_pool)
    }

    async fn create_resource_server(
        &self,
        pool_id: &str,
        identifier: &str,
        scopes: &[(String, String)],
    ) -> Result<()> {
        let scopes: Vec<String> = scopes
            .iter()
            .map(|(name, desc)| format!("ScopeName={name},ScopeDescription={desc}"))
            .collect();

        let mut args = Self::args(&[
            "cognito-idp",
            "create-resource-server",
            "--user-pool-id",
            pool_id,
            "--identifier",
            identifier,
            "--name",
            identifier,
            "--scopes",
        ]);
        args.extend(scopes);

        self.run_command("CreateResourceServer", &args).await?;
        Ok(())
    }

    async fn create_user_pool_client(
        &self,
        pool_id: &str,
        name: &str,
        allowed_scopes: &[String],
    ) -> Result<UserPoolClient> {
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(rename = "UserPoolClient")]
            user_pool_client: UserPoolClient,
        }

        // client-credentials flow only; interactive sign-in stays disabled
        let mut args = Self::args(&[
            "cognito-idp",
            "create-user-pool-client",
            "--user-pool-id",
            pool_id,
            "--client-name",
            name,
            "--generate-secret",
            "--allowed-o-auth-flows-user-pool-client",
            "--allowed-o-auth-flows",
            "client_credentials",
            "--allowed-o-auth-scopes",
        ]);
        args.extend(allowed_scopes.iter().cloned());

        let response: Response = self.run_json("CreateUserPoolClient", &args).await?;
        Ok(response.user_pool_client)
    }

    async fn create_user_pool_domain(&self, pool_id: &str, domain: &str) -> Result<()> {
        self.run_command(
            "CreateUserPoolDomain",
            &Self::args(&[
                "cognito-idp",
                "create-user-pool-domain",
                "--user-pool-id",
                pool_id,
                "--domain",
                domain,
            ]),
        )
        .await?;
        Ok(())
    }

    async fn delete_user_pool_domain(&self, pool_id: &str, domain: &str) -> Result<()> {
        self.run_command(
            "DeleteUserPoolDomain",
            &Self::args(&[
                "cognito-idp",
                "delete-user-pool-domain",
                "--user-pool-id",
                pool_id,
                "--domain",
                domain,
            ]),
        )
        .await?;
        Ok(())
    }

    async fn delete_user_pool(&self, pool_id: &str) -> Result<()> {
        self.run_command(
            "DeleteUserPool",
            &Self::args(&["cognito-idp", "delete-user-pool", "--user-pool-id", pool_id]),
        )
        .await?;
        Ok(())
    }

    // ========== Execution role ==========

    async fn create_role(
        &self,
        name: &str,
        assume_role_policy: &serde_json::Value,
    ) -> Result<Role> {
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(rename = "Role")]
            role: Role,
        }

        let trust = serde_json::to_string(assume_role_policy)?;
        let response: Response = self
            .run_json(
                "CreateRole",
                &Self::args(&[
                    "iam",
                    "create-role",
                    "--role-name",
                    name,
                    "--assume-role-policy-document",
                    &trust,
                ]),
            )
            .await?;
        Ok(response.role)
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy: &serde_json::Value,
    ) -> Result<()> {
        let policy = serde_json::to_string(policy)?;
        self.run_command(
            "PutRolePolicy",
            &Self::args(&[
                "iam",
                "put-role-policy",
                "--role-name",
                role_name,
                "--policy-name",
                policy_name,
                "--policy-document",
                &policy,
            ]),
        )
        .await?;
        Ok(())
    }

    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> Result<()> {
        self.run_command(
            "DeleteRolePolicy",
            &Self::args(&[
                "iam",
                "delete-role-policy",
                "--role-name",
                role_name,
                "--policy-name",
                policy_name,
            ]),
        )
        .await?;
        Ok(())
    }

    async fn delete_role(&self, role_name: &str) -> Result<()> {
        self.run_command(
            "DeleteRole",
            &Self::args(&["iam", "delete-role", "--role-name", role_name]),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_cli_surfaces_as_not_found() {
        let cli = AwsCli::with_binary("aws-binary-that-does-not-exist", "us-east-1");
        let err = cli.check_auth().await.unwrap_err();
        assert!(matches!(err, ControlPlaneError::AwsCliNotFound));
    }
}
