//! Deployment configuration model
//!
//! The deployment document is a single JSON file describing the gateway,
//! its integration targets and the account/region it lands in. Everything
//! here is validated before any control-plane call is made.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Target types with this prefix use a schema document pre-built and hosted
/// by the platform instead of a locally templated one.
pub const PREBUILT_SCHEMA_PREFIX: &str = "aws.";

/// Top-level deployment document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    /// Stack name, used as the namespace for deterministic resource names
    pub stack_name: String,

    pub gateway: GatewayConfig,

    #[serde(default)]
    pub integration_targets: Vec<IntegrationTargetConfig>,

    pub aws: AwsSettings,
}

/// Gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub enable_semantic_search: bool,

    /// Exception verbosity passed through to the control plane (e.g. "DEBUG")
    #[serde(default)]
    pub exception_level: Option<String>,

    #[serde(default)]
    pub authentication_type: AuthenticationType,

    /// Bucket hosting pre-built schema documents, required only when an
    /// `aws.`-prefixed target is enabled
    #[serde(default)]
    pub agent_core_schemas_bucket: Option<String>,

    /// Free-text instructions attached to the gateway protocol configuration
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Inbound authentication mode for the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthenticationType {
    /// Token-based auth backed by a machine-to-machine identity pool
    #[default]
    Jwt,
    /// Ambient-credential request signing, no identity pool provisioned
    Iam,
}

impl std::fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthenticationType::Jwt => write!(f, "JWT"),
            AuthenticationType::Iam => write!(f, "IAM"),
        }
    }
}

/// One external service registered behind the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationTargetConfig {
    /// Type key, unique within a deployment (e.g. "jira", "aws.support")
    #[serde(rename = "type")]
    pub target_type: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub config: TargetSettings,
}

fn default_enabled() -> bool {
    true
}

/// Per-target settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSettings {
    /// Secret material for outbound calls to the target
    pub api_key: String,

    /// Base URL substituted into the schema template; required unless the
    /// target uses a pre-built schema
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub auth: Option<TargetAuthSettings>,
}

/// How the API key is attached to outbound requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAuthSettings {
    /// Header or query parameter name (default "Authorization")
    #[serde(default)]
    pub parameter_name: Option<String>,

    /// Value prefix (default "Basic")
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Account and region the stack deploys into
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsSettings {
    pub account: String,
    pub region: String,
}

impl IntegrationTargetConfig {
    /// Whether this target references a pre-built, externally hosted schema
    pub fn is_prebuilt(&self) -> bool {
        self.target_type.starts_with(PREBUILT_SCHEMA_PREFIX)
    }

    /// Type key with the pre-built marker stripped
    pub fn short_type(&self) -> &str {
        self.target_type
            .strip_prefix(PREBUILT_SCHEMA_PREFIX)
            .unwrap_or(&self.target_type)
    }

    /// Schema file name by convention: `{type}-open-api.json`
    pub fn schema_file_name(&self) -> String {
        format!("{}-open-api.json", self.short_type())
    }

    /// Parameter name carrying the API key (default "Authorization").
    /// Pre-built targets always use the default.
    pub fn auth_parameter_name(&self) -> &str {
        if self.is_prebuilt() {
            return "Authorization";
        }
        self.config
            .auth
            .as_ref()
            .and_then(|a| a.parameter_name.as_deref())
            .unwrap_or("Authorization")
    }

    /// Value prefix for the API key (default "Basic")
    pub fn auth_prefix(&self) -> &str {
        if self.is_prebuilt() {
            return "Basic";
        }
        self.config
            .auth
            .as_ref()
            .and_then(|a| a.prefix.as_deref())
            .unwrap_or("Basic")
    }
}

impl DeployConfig {
    /// Enabled targets only; disabled entries never touch any resource
    pub fn enabled_targets(&self) -> impl Iterator<Item = &IntegrationTargetConfig> {
        self.integration_targets.iter().filter(|t| t.enabled)
    }

    /// Fail-fast validation, run before any external call
    pub fn validate(&self) -> Result<()> {
        if self.stack_name.is_empty() {
            return Err(CoreError::ConfigValidation(
                "stackName must not be empty".to_string(),
            ));
        }
        if self.gateway.name.is_empty() {
            return Err(CoreError::ConfigValidation(
                "gateway.name must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for target in &self.integration_targets {
            if !seen.insert(target.target_type.as_str()) {
                return Err(CoreError::ConfigValidation(format!(
                    "duplicate integration target type '{}'",
                    target.target_type
                )));
            }
        }

        for target in self.enabled_targets() {
            if target.is_prebuilt() {
                if self.gateway.agent_core_schemas_bucket.is_none() {
                    return Err(CoreError::ConfigValidation(format!(
                        "target '{}' uses a pre-built schema but gateway.agentCoreSchemasBucket is not set",
                        target.target_type
                    )));
                }
            } else if target
                .config
                .base_url
                .as_deref()
                .is_none_or(|u| u.is_empty())
            {
                return Err(CoreError::ConfigValidation(format!(
                    "target '{}' uses a custom schema but config.baseUrl is not set",
                    target.target_type
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> DeployConfig {
        serde_json::from_str(
            r#"{
                "stackName": "demo",
                "gateway": { "name": "demo-gateway", "authenticationType": "JWT" },
                "integrationTargets": [
                    {
                        "type": "jira",
                        "enabled": true,
                        "config": { "apiKey": "secret", "baseUrl": "https://jira.example.com" }
                    }
                ],
                "aws": { "account": "123456789012", "region": "us-east-1" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_and_validate() {
        let config = sample_config();
        assert_eq!(config.stack_name, "demo");
        assert_eq!(config.gateway.authentication_type, AuthenticationType::Jwt);
        config.validate().unwrap();
    }

    #[test]
    fn test_custom_target_requires_base_url() {
        let mut config = sample_config();
        config.integration_targets[0].config.base_url = None;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::ConfigValidation(_)));
        assert!(err.to_string().contains("baseUrl"));
    }

    #[test]
    fn test_disabled_target_skips_base_url_check() {
        let mut config = sample_config();
        config.integration_targets[0].config.base_url = None;
        config.integration_targets[0].enabled = false;

        config.validate().unwrap();
    }

    #[test]
    fn test_prebuilt_target_requires_schemas_bucket() {
        let mut config = sample_config();
        config.integration_targets[0].target_type = "aws.support".to_string();
        config.integration_targets[0].config.base_url = None;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("agentCoreSchemasBucket"));

        config.gateway.agent_core_schemas_bucket = Some("platform-schemas".to_string());
        config.validate().unwrap();
    }

    #[test]
    fn test_duplicate_target_type_rejected() {
        let mut config = sample_config();
        let dup = config.integration_targets[0].clone();
        config.integration_targets.push(dup);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prebuilt_marker_and_defaults() {
        let mut config = sample_config();
        config.integration_targets[0].target_type = "aws.support".to_string();

        let target = &config.integration_targets[0];
        assert!(target.is_prebuilt());
        assert_eq!(target.short_type(), "support");
        assert_eq!(target.schema_file_name(), "support-open-api.json");
        assert_eq!(target.auth_parameter_name(), "Authorization");
        assert_eq!(target.auth_prefix(), "Basic");
    }

    #[test]
    fn test_auth_defaults_for_custom_target() {
        let config = sample_config();
        let target = &config.integration_targets[0];
        assert!(!target.is_prebuilt());
        assert_eq!(target.auth_parameter_name(), "Authorization");
        assert_eq!(target.auth_prefix(), "Basic");
    }

    #[test]
    fn test_iam_mode_parses() {
        let config: DeployConfig = serde_json::from_str(
            r#"{
                "stackName": "demo",
                "gateway": { "name": "g", "authenticationType": "IAM" },
                "aws": { "account": "123456789012", "region": "us-east-1" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.gateway.authentication_type, AuthenticationType::Iam);
        assert!(config.integration_targets.is_empty());
    }
}
