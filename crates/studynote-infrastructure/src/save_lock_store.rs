//! Save-lock storage backends.

use crate::paths::StudynotePaths;
use crate::storage::AtomicTomlFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;
use studynote_core::error::{NoteError, Result};
use studynote_core::save_lock::SaveLockStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SaveLockFile {
    #[serde(default)]
    locks: BTreeMap<String, DateTime<Utc>>,
}

/// Save locks kept in a TOML file so they survive a reload.
///
/// Expired entries are pruned when the store is opened.
pub struct FileSaveLockStore {
    file: AtomicTomlFile<SaveLockFile>,
}

impl FileSaveLockStore {
    pub fn open(paths: &StudynotePaths) -> Result<Self> {
        Self::open_at(paths.save_lock_file()?)
    }

    pub fn open_at(path: PathBuf) -> Result<Self> {
        let store = Self {
            file: AtomicTomlFile::new(path),
        };
        let pruned = store.prune_expired(Utc::now())?;
        if pruned > 0 {
            tracing::debug!("[FileSaveLockStore] Pruned {} expired lock(s)", pruned);
        }
        Ok(store)
    }

    fn read(&self) -> Result<SaveLockFile> {
        Ok(self.file.load()?.unwrap_or_default())
    }
}

impl SaveLockStore for FileSaveLockStore {
    fn expiry(&self, note_id: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read()?.locks.get(note_id).copied())
    }

    fn set_expiry(&self, note_id: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.file.update(SaveLockFile::default(), |data| {
            data.locks.insert(note_id.to_string(), expires_at);
            Ok(())
        })
    }

    fn remove(&self, note_id: &str) -> Result<Option<DateTime<Utc>>> {
        let mut removed = None;
        self.file.update(SaveLockFile::default(), |data| {
            removed = data.locks.remove(note_id);
            Ok(())
        })?;
        Ok(removed)
    }

    fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        if self.read()?.locks.values().all(|expires_at| *expires_at > now) {
            return Ok(0);
        }
        let mut pruned = 0;
        self.file.update(SaveLockFile::default(), |data| {
            let before = data.locks.len();
            data.locks.retain(|_, expires_at| *expires_at > now);
            pruned = before - data.locks.len();
            Ok(())
        })?;
        Ok(pruned)
    }
}

/// Process-local save locks.
#[derive(Default)]
pub struct InMemorySaveLockStore {
    locks: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl InMemorySaveLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_locks<R>(&self, f: impl FnOnce(&mut HashMap<String, DateTime<Utc>>) -> R) -> Result<R> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| NoteError::internal("Save-lock map poisoned"))?;
        Ok(f(&mut locks))
    }
}

impl SaveLockStore for InMemorySaveLockStore {
    fn expiry(&self, note_id: &str) -> Result<Option<DateTime<Utc>>> {
        self.with_locks(|locks| locks.get(note_id).copied())
    }

    fn set_expiry(&self, note_id: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.with_locks(|locks| {
            locks.insert(note_id.to_string(), expires_at);
        })
    }

    fn remove(&self, note_id: &str) -> Result<Option<DateTime<Utc>>> {
        self.with_locks(|locks| locks.remove(note_id))
    }

    fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        self.with_locks(|locks| {
            let before = locks.len();
            locks.retain(|_, expires_at| *expires_at > now);
            before - locks.len()
        })
    }
}
