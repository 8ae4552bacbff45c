//! State tracking for provisioned resources
//!
//! `.gateflow/state.json` records the physical id captured when each
//! resource was first created; re-running a deployment finds the record
//! and updates in place instead of creating a duplicate.

use crate::error::{ProvisionError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".gateflow";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// How long a lock file stays authoritative without being released
const LOCK_EXPIRY_HOURS: i64 = 1;

/// All resource records for one deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    pub version: u32,
    pub updated_at: DateTime<Utc>,

    /// Records indexed by logical resource key
    pub resources: HashMap<String, ResourceRecord>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: HashMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_resource(&mut self, key: String, record: ResourceRecord) {
        self.resources.insert(key, record);
        self.updated_at = Utc::now();
    }

    pub fn remove_resource(&mut self, key: &str) -> Option<ResourceRecord> {
        let result = self.resources.remove(key);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    pub fn get_resource(&self, key: &str) -> Option<&ResourceRecord> {
        self.resources.get(key)
    }
}

/// One provisioned resource: the captured physical id plus the typed state
/// its manager needs to update or delete it later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Control-plane-assigned identifier
    pub physical_id: String,

    /// Resource type (e.g. "gateway", "gateway-target", "secret")
    pub resource_type: String,

    /// Serialized manager state, opaque to the engine
    pub state: serde_json::Value,

    /// Digest of the params this revision was applied with; a matching
    /// digest on the next plan means the resource is unchanged. Absent in
    /// records written before digests were tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_digest: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceRecord {
    pub fn new(
        physical_id: impl Into<String>,
        resource_type: impl Into<String>,
        state: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            physical_id: physical_id.into(),
            resource_type: resource_type.into(),
            state,
            params_digest: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Carry the original creation timestamp through an update
    pub fn updated(self, physical_id: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            physical_id: physical_id.into(),
            state,
            updated_at: Utc::now(),
            ..self
        }
    }
}

/// Reads and writes the state file
pub struct StateManager {
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(ProvisionError::State(format!(
                "state file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    /// Persist the state. The previous revision is kept as a backup and
    /// the new one lands via write-then-rename, so a crash mid-save never
    /// leaves a truncated live file.
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        if path.exists() {
            fs::copy(&path, self.backup_path()).await?;
        }

        let staged = self.state_dir().join(format!("{STATE_FILE}.tmp"));
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&staged, content).await?;
        fs::rename(&staged, &path).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }

    /// Take the deployment lock. A lock left behind by a dead run expires
    /// after an hour and is replaced.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();

        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < LOCK_EXPIRY_HOURS {
                return Err(ProvisionError::Lock(format!(
                    "another deployment holds the lock ({}, since {})",
                    lock_info.holder, lock_info.acquired_at
                )));
            }

            tracing::warn!(holder = %lock_info.holder, "Replacing expired lock");
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| format!("pid-{}", std::process::id())),
            acquired_at: Utc::now(),
        };

        let content = serde_json::to_string_pretty(&lock_info)?;
        fs::write(&lock_path, content).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for the deployment lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            // Drop has no async context, so remove blocking
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = GlobalState::new();
        state.set_resource(
            "gateway".to_string(),
            ResourceRecord::new(
                "GW12345",
                "gateway",
                serde_json::json!({"gatewayId": "GW12345"}),
            ),
        );

        manager.save(&state).await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.resources.len(), 1);
        assert_eq!(loaded.get_resource("gateway").unwrap().physical_id, "GW12345");
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load().await.unwrap();
        assert!(state.resources.is_empty());
    }

    #[tokio::test]
    async fn test_lock_blocks_second_holder() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let lock = manager.acquire_lock().await.unwrap();
        let second = manager.acquire_lock().await;
        assert!(matches!(second, Err(ProvisionError::Lock(_))));

        lock.release().await.unwrap();
        let third = manager.acquire_lock().await.unwrap();
        third.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_save_creates_backup() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = GlobalState::new();
        manager.save(&state).await.unwrap();
        manager.save(&state).await.unwrap();

        assert!(temp_dir.path().join(".gateflow/state.json.backup").exists());
    }

    #[tokio::test]
    async fn test_backup_holds_previous_revision() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut first = GlobalState::new();
        first.set_resource(
            "a".to_string(),
            ResourceRecord::new("ID-A", "fake", serde_json::json!({})),
        );
        manager.save(&first).await.unwrap();

        let mut second = first.clone();
        second.set_resource(
            "b".to_string(),
            ResourceRecord::new("ID-B", "fake", serde_json::json!({})),
        );
        manager.save(&second).await.unwrap();

        let backup_raw =
            std::fs::read_to_string(temp_dir.path().join(".gateflow/state.json.backup")).unwrap();
        let backup: GlobalState = serde_json::from_str(&backup_raw).unwrap();
        assert_eq!(backup.resources.len(), 1);

        let live = manager.load().await.unwrap();
        assert_eq!(live.resources.len(), 2);
        assert!(!temp_dir.path().join(".gateflow/state.json.tmp").exists());
    }
}
