//! Shared command context: config discovery and control-plane setup

use anyhow::Context as _;
use gateflow_controlplane::AwsCli;
use gateflow_core::DeployConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command needs: the validated config plus the directories
/// derived from where it was found
pub struct DeploymentContext {
    pub config: DeployConfig,
    pub config_path: PathBuf,
    /// Directory holding the config; state and schema templates live here
    pub project_root: PathBuf,
}

impl DeploymentContext {
    pub fn load(config_flag: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = match config_flag {
            Some(path) => path,
            None => gateflow_core::find_config_file()
                .context("no deployment config found (gateflow.json)")?,
        };

        let config = gateflow_core::load_config(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?;

        let project_root = config_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            config,
            config_path,
            project_root,
        })
    }

    /// Schema templates sit next to the config file
    pub fn schema_dir(&self) -> PathBuf {
        self.project_root.clone()
    }

    pub fn control_plane(&self, profile: Option<String>) -> Arc<AwsCli> {
        Arc::new(AwsCli::new(self.config.aws.region.clone(), profile))
    }
}
