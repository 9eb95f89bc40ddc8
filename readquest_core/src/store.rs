//! Progression state persistence with file locking.
//!
//! The store is the only mutation path for a user's XP and unlock
//! set. `FileStore` keeps one directory per user containing a
//! `state.json` (the authoritative state), an `unlocks.log` (append-
//! only audit trail of unlock events) and a lock file.
//!
//! A commit holds the user's lock file exclusively across the whole
//! read-filter-write sequence. Re-reading the state under that lock is
//! what makes the unlock insert conditional: an achievement a
//! concurrent commit already recorded is dropped from this commit and
//! contributes no XP.

use crate::types::{UnlockEvent, UserProgressionState};
use crate::{csv_rollup, unlock_log, Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// An unlock the engine wants to record
#[derive(Clone, Debug)]
pub struct PendingUnlock {
    pub code: String,
    pub xp_reward: u32,
    pub unlocked_at: DateTime<Utc>,
}

/// What a commit actually applied
#[derive(Clone, Debug)]
pub struct CommitReceipt {
    /// Codes actually inserted by this commit, in the order submitted.
    /// Codes a concurrent commit won are absent.
    pub accepted: Vec<String>,
    /// XP as re-read inside the critical section, before this commit
    pub previous_xp: i64,
    /// XP after this commit
    pub new_xp: i64,
}

/// Persistence contract for user progression
pub trait ProgressionStore {
    /// Read a user's current state (fresh users get the default state)
    fn load(&self, user_id: &str) -> Result<UserProgressionState>;

    /// Atomically record unlocks and their XP. Pending unlocks whose
    /// code is already present are skipped, not errors.
    fn commit(&self, user_id: &str, pending: &[PendingUnlock]) -> Result<CommitReceipt>;
}

/// File-backed progression store
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given data directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding a user's files
    pub fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join("users").join(user_id)
    }

    /// Path to a user's state file
    pub fn state_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("state.json")
    }

    /// Path to a user's unlock event log
    pub fn log_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("unlocks.log")
    }

    /// Path to a user's archived unlock CSV
    pub fn csv_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("unlocks.csv")
    }

    fn lock_path(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join(".lock")
    }

    /// Parse a state file.
    ///
    /// A missing file is a fresh user; a file that exists but cannot
    /// be parsed is an error — an XP ledger is never silently reset.
    fn read_state_file(path: &Path) -> Result<UserProgressionState> {
        if !path.exists() {
            tracing::debug!("No state file at {:?}, user is new", path);
            return Ok(UserProgressionState::default());
        }

        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;

        serde_json::from_str(&contents).map_err(|e| {
            Error::Store(format!("corrupt state file {:?}: {}", path, e))
        })
    }

    /// Atomically write a state file (temp file, fsync, rename)
    fn write_state_file(path: &Path, state: &UserProgressionState) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Store(format!("state path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(state)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved progression state to {:?}", path);
        Ok(())
    }

    /// Open and exclusively lock the user's lock file
    fn acquire_lock(&self, user_id: &str) -> Result<File> {
        let lock_path = self.lock_path(user_id);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)?;
        lock_file.lock_exclusive()?;
        Ok(lock_file)
    }

    /// Roll a user's unlock log into the CSV archive.
    ///
    /// Holds the user's lock exclusively for the whole read-append-
    /// rename sequence, so a commit cannot slip an event into the log
    /// between the CSV write and the rename: every logged event
    /// reaches the archive. Returns the number of events archived.
    pub fn rollup(&self, user_id: &str) -> Result<usize> {
        if !self.log_path(user_id).exists() {
            return Ok(0);
        }

        let lock_file = self.acquire_lock(user_id)?;
        let log_path = self.log_path(user_id);
        let result = if log_path.exists() {
            csv_rollup::log_to_csv_and_archive(&log_path, &self.csv_path(user_id))
        } else {
            // Another rollup archived it while we waited for the lock
            Ok(0)
        };
        lock_file.unlock()?;
        result
    }
}

impl ProgressionStore for FileStore {
    fn load(&self, user_id: &str) -> Result<UserProgressionState> {
        let state_path = self.state_path(user_id);
        if !state_path.exists() {
            return Ok(UserProgressionState::default());
        }

        // Shared lock against a concurrent commit's rename
        let lock_path = self.lock_path(user_id);
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)?;
        lock_file.lock_shared()?;
        let state = Self::read_state_file(&state_path);
        lock_file.unlock()?;
        state
    }

    fn commit(&self, user_id: &str, pending: &[PendingUnlock]) -> Result<CommitReceipt> {
        let lock_file = self.acquire_lock(user_id)?;

        // The body runs with the lock held; errors release it on drop
        let result = (|| {
            let state_path = self.state_path(user_id);
            let mut state = Self::read_state_file(&state_path)?;
            let previous_xp = state.current_xp;

            // Conditional insert: only codes not already present win
            let mut accepted = Vec::new();
            let mut events = Vec::new();
            let mut awarded: i64 = 0;

            for unlock in pending {
                if state.is_unlocked(&unlock.code) {
                    tracing::debug!(
                        "Unlock '{}' already recorded for {}, skipping",
                        unlock.code,
                        user_id
                    );
                    continue;
                }
                state
                    .unlocked
                    .insert(unlock.code.clone(), unlock.unlocked_at);
                awarded += i64::from(unlock.xp_reward);
                accepted.push(unlock.code.clone());
                events.push(UnlockEvent {
                    id: Uuid::new_v4(),
                    user_id: user_id.to_string(),
                    code: unlock.code.clone(),
                    unlocked_at: unlock.unlocked_at,
                });
            }

            let new_xp = previous_xp + awarded;

            if !accepted.is_empty() {
                state.current_xp = new_xp;
                Self::write_state_file(&state_path, &state)?;
                unlock_log::append_events(&self.log_path(user_id), &events)?;
                tracing::info!(
                    "Committed {} unlocks (+{} XP) for {}",
                    accepted.len(),
                    awarded,
                    user_id
                );
            }

            Ok(CommitReceipt {
                accepted,
                previous_xp,
                new_xp,
            })
        })();

        lock_file.unlock()?;
        result
    }
}
