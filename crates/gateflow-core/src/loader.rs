//! Deployment config discovery and loading

use crate::config::DeployConfig;
use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};

const CANDIDATES: &[&str] = &["gateflow.json", ".gateflow.json"];

/// Find the deployment config file.
///
/// Search order:
/// 1. `GATEFLOW_CONFIG` environment variable (direct path)
/// 2. current directory: gateflow.json, .gateflow.json
/// 3. `./.gateflow/` directory, same names
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var("GATEFLOW_CONFIG") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir().map_err(|e| CoreError::Io {
        path: PathBuf::from("."),
        message: e.to_string(),
    })?;

    for filename in CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let dot_dir = current_dir.join(".gateflow");
    if dot_dir.is_dir() {
        for filename in CANDIDATES {
            let path = dot_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    Err(CoreError::ConfigFileNotFound)
}

/// Load and validate a deployment config from `path`
pub fn load_config(path: impl AsRef<Path>) -> Result<DeployConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let config: DeployConfig = serde_json::from_str(&content)?;
    config.validate()?;

    tracing::debug!(
        stack = %config.stack_name,
        targets = config.integration_targets.len(),
        "Loaded deployment config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"{
        "stackName": "demo",
        "gateway": { "name": "demo-gateway" },
        "aws": { "account": "123456789012", "region": "us-east-1" }
    }"#;

    #[test]
    fn test_load_valid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gateflow.json");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.stack_name, "demo");
    }

    #[test]
    fn test_load_invalid_config_fails_validation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gateflow.json");
        std::fs::write(
            &path,
            r#"{
                "stackName": "",
                "gateway": { "name": "g" },
                "aws": { "account": "1", "region": "us-east-1" }
            }"#,
        )
        .unwrap();

        assert!(matches!(
            load_config(&path),
            Err(CoreError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gateflow.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(load_config(&path), Err(CoreError::Json(_))));
    }
}
