//! Control-plane request and response shapes
//!
//! The gateway control plane speaks camelCase JSON; the identity, secret
//! and role services answer in PascalCase, so those response structs carry
//! explicit renames.

use serde::{Deserialize, Serialize};

// ========== Gateway ==========

/// Parameters for CreateGateway / UpdateGateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayParams {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub role_arn: String,

    /// Always "MCP"
    pub protocol_type: String,

    pub protocol_configuration: ProtocolConfiguration,

    /// "CUSTOM_JWT" or "AWS_IAM"
    pub authorizer_type: String,

    /// Present exactly when authorizer_type is "CUSTOM_JWT"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorizer_configuration: Option<AuthorizerConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolConfiguration {
    pub mcp: McpConfiguration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpConfiguration {
    pub supported_versions: Vec<String>,

    /// "SEMANTIC" when semantic search is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerConfiguration {
    pub custom_jwt_authorizer: CustomJwtAuthorizer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomJwtAuthorizer {
    pub discovery_url: String,
    pub allowed_clients: Vec<String>,
}

/// CreateGateway / UpdateGateway response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gateway {
    pub gateway_id: String,
    pub gateway_arn: String,
    pub gateway_url: String,
    #[serde(default)]
    pub status: Option<String>,
}

// ========== Gateway targets ==========

/// Parameters for CreateGatewayTarget / UpdateGatewayTarget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTargetParams {
    pub gateway_identifier: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub target_configuration: TargetConfiguration,
    pub credential_provider_configurations: Vec<CredentialProviderConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfiguration {
    pub mcp: McpTargetConfiguration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTargetConfiguration {
    pub open_api_schema: ApiSchemaConfiguration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSchemaConfiguration {
    pub s3: S3SchemaLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3SchemaLocation {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProviderConfiguration {
    /// Always "API_KEY" in this stack
    pub credential_provider_type: String,
    pub credential_provider: CredentialProviderDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProviderDetails {
    pub api_key_credential_provider: ApiKeyCredentialProvider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyCredentialProvider {
    pub provider_arn: String,
    pub credential_location: CredentialLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_parameter_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_prefix: Option<String>,
}

/// Where the API key rides on outbound requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialLocation {
    Header,
    QueryParameter,
}

/// CreateGatewayTarget / UpdateGatewayTarget response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTarget {
    pub target_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

// ========== Credential providers ==========

/// CreateApiKeyCredentialProvider response.
///
/// The ARN is optional because not every control-plane build returns it;
/// see the fallback handling in the target lifecycle manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProviderHandle {
    pub name: String,
    #[serde(default)]
    pub credential_provider_arn: Option<String>,
}

// ========== Secrets ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    #[serde(rename = "ARN")]
    pub arn: String,
    #[serde(rename = "Name")]
    pub name: String,
}

// ========== Identity pool ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPool {
    #[serde(rename = "Id")]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPoolClient {
    #[serde(rename = "ClientId")]
    pub client_id: String,
}

// ========== IAM role ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "RoleName")]
    pub role_name: String,
    #[serde(rename = "Arn")]
    pub arn: String,
}

// ========== Auth check ==========

/// Result of the pre-deploy credential check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub account_info: Option<String>,
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
