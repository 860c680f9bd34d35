//! Observed account state and its on-disk store
//!
//! Manages the `.crewflow/accounts.json` file which records the last
//! observed state of every account under management. The store only ever
//! receives state that came out of a reconciliation cycle, so a partially
//! failed cycle persists exactly the mutations that succeeded.

use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".crewflow";
const STATE_FILE: &str = "accounts.json";
const STATE_BACKUP: &str = "accounts.json.backup";
const LOCK_FILE: &str = "lock.json";

/// Last observed state of a single remote account
///
/// The service is the source of truth for every field except `password`,
/// which is a local placeholder only: it tracks whether a caller-supplied
/// initial credential has been communicated. The service never returns
/// passwords, and a generated credential is never recorded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Server-assigned identity key; never reassigned once set
    pub did: String,

    pub handle: String,

    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_name: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// Last reconciliation that changed this record
    pub updated_at: DateTime<Utc>,
}

impl AccountState {
    pub fn new(
        did: impl Into<String>,
        handle: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            did: did.into(),
            handle: handle.into(),
            email: email.into(),
            password: None,
            display_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// All tracked accounts, keyed by roster entry name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    pub accounts: BTreeMap<String, AccountState>,
}

impl Default for RosterState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            accounts: BTreeMap::new(),
        }
    }
}

impl RosterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AccountState> {
        self.accounts.get(name)
    }

    /// Add or replace an account record
    pub fn set(&mut self, name: impl Into<String>, state: AccountState) {
        self.accounts.insert(name.into(), state);
        self.updated_at = Utc::now();
    }

    pub fn remove(&mut self, name: &str) -> Option<AccountState> {
        let result = self.accounts.remove(name);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AccountState)> {
        self.accounts.iter()
    }
}

/// Store for reading/writing the roster state file
pub struct StateStore {
    /// Project root directory
    project_root: PathBuf,
}

impl StateStore {
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

    /// Load the current state
    pub async fn load(&self) -> Result<RosterState> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(RosterState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: RosterState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(EngineError::State(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} accounts", state.accounts.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup
    pub async fn save(&self, state: &RosterState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} accounts", state.accounts.len());
        Ok(())
    }

    /// Acquire a lock for exclusive access
    ///
    /// A lock left behind by a crashed run is broken after one hour.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();

        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < 1 {
                return Err(EngineError::Lock(format!(
                    "State is locked by {} since {}",
                    lock_info.holder, lock_info.acquired_at
                )));
            }

            tracing::warn!("Removing stale lock from {}", lock_info.holder);
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
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

/// Lock information
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for the state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Release the lock
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
            // Synchronous cleanup in drop - not ideal but necessary
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
