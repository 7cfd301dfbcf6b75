//! Save-lock countdown.
//!
//! Right after a note is created its id is still being reconciled with the
//! backend, so pin and tag actions are held back for a short window. The
//! window is stored as an absolute expiry in a [`SaveLockStore`] that lives
//! outside the note store, which lets it survive a reload.

use crate::error::{NoteError, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Storage for save-lock expiries keyed by note id.
pub trait SaveLockStore: Send + Sync {
    /// Returns the stored expiry, if any (expired entries may be returned).
    fn expiry(&self, note_id: &str) -> Result<Option<DateTime<Utc>>>;

    /// Stores or replaces an expiry.
    fn set_expiry(&self, note_id: &str, expires_at: DateTime<Utc>) -> Result<()>;

    /// Removes an entry and returns its expiry.
    fn remove(&self, note_id: &str) -> Result<Option<DateTime<Utc>>>;

    /// Drops entries that expired at or before `now`. Returns how many.
    fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Timed lock keyed by note id.
#[derive(Clone)]
pub struct SaveLockCountdown {
    store: Arc<dyn SaveLockStore>,
}

impl SaveLockCountdown {
    pub fn new(store: Arc<dyn SaveLockStore>) -> Self {
        Self { store }
    }

    /// Starts (or restarts) a lock lasting `duration_secs` from now.
    pub fn start(&self, note_id: &str, duration_secs: u64) -> Result<DateTime<Utc>> {
        self.start_at(note_id, duration_secs, Utc::now())
    }

    pub fn start_at(
        &self,
        note_id: &str,
        duration_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let expires_at = i64::try_from(duration_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| NoteError::validation("Save-lock duration is too large"))?;
        self.store.set_expiry(note_id, expires_at)?;
        tracing::debug!(
            "[SaveLock] Locked note {} until {}",
            note_id,
            expires_at.to_rfc3339()
        );
        Ok(expires_at)
    }

    /// Whole seconds left, rounded up; 0 when unlocked.
    pub fn remaining(&self, note_id: &str) -> u64 {
        self.remaining_at(note_id, Utc::now())
    }

    pub fn remaining_at(&self, note_id: &str, now: DateTime<Utc>) -> u64 {
        let expires_at = match self.store.expiry(note_id) {
            Ok(Some(expires_at)) => expires_at,
            Ok(None) => return 0,
            Err(e) => {
                tracing::warn!("[SaveLock] Failed to read lock for {}: {}", note_id, e);
                return 0;
            }
        };

        let left_ms = (expires_at - now).num_milliseconds();
        if left_ms <= 0 {
            0
        } else {
            u64::try_from(left_ms).map_or(0, |ms| ms.div_ceil(1000))
        }
    }

    /// Moves a lock to a new id, keeping its expiry.
    ///
    /// A missing lock is not an error; there is simply nothing to move.
    pub fn rehome(&self, old_id: &str, new_id: &str) -> Result<()> {
        if let Some(expires_at) = self.store.remove(old_id)? {
            self.store.set_expiry(new_id, expires_at)?;
            tracing::debug!("[SaveLock] Rehomed lock {} -> {}", old_id, new_id);
        }
        Ok(())
    }

    /// Drops the lock for a note (e.g. after a rolled-back save).
    pub fn release(&self, note_id: &str) -> Result<()> {
        self.store.remove(note_id)?;
        Ok(())
    }

    /// Fails with `NoteError::Locked` while the window is open.
    pub fn ensure_unlocked(&self, note_id: &str) -> Result<()> {
        match self.remaining(note_id) {
            0 => Ok(()),
            remaining_secs => Err(NoteError::locked(note_id, remaining_secs)),
        }
    }

    pub fn prune(&self) -> Result<usize> {
        self.store.prune_expired(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock SaveLockStore for testing
    #[derive(Default)]
    struct MockSaveLockStore {
        entries: Mutex<HashMap<String, DateTime<Utc>>>,
    }

    impl SaveLockStore for MockSaveLockStore {
        fn expiry(&self, note_id: &str) -> Result<Option<DateTime<Utc>>> {
            Ok(self.entries.lock().unwrap().get(note_id).copied())
        }

        fn set_expiry(&self, note_id: &str, expires_at: DateTime<Utc>) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(note_id.to_string(), expires_at);
            Ok(())
        }

        fn remove(&self, note_id: &str) -> Result<Option<DateTime<Utc>>> {
            Ok(self.entries.lock().unwrap().remove(note_id))
        }

        fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize> {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|_, expires_at| *expires_at > now);
            Ok(before - entries.len())
        }
    }

    fn countdown() -> SaveLockCountdown {
        SaveLockCountdown::new(Arc::new(MockSaveLockStore::default()))
    }

    #[test]
    fn test_remaining_counts_down() {
        let locks = countdown();
        let now = Utc::now();
        locks.start_at("temp_1", 5, now).unwrap();

        assert_eq!(locks.remaining_at("temp_1", now), 5);
        assert_eq!(
            locks.remaining_at("temp_1", now + Duration::milliseconds(1500)),
            4
        );
        assert_eq!(locks.remaining_at("temp_1", now + Duration::seconds(5)), 0);
        assert_eq!(locks.remaining_at("unknown", now), 0);
    }

    #[test]
    fn test_oversized_duration_is_rejected() {
        let locks = countdown();
        let now = Utc::now();
        for secs in [u64::MAX, 10_000_000_000_000, i64::MAX as u64 / 1000] {
            let err = locks.start_at("temp_1", secs, now).unwrap_err();
            assert!(err.is_validation(), "{} seconds", secs);
        }
        assert_eq!(locks.remaining_at("temp_1", now), 0);
    }

    #[test]
    fn test_rehome_keeps_expiry() {
        let locks = countdown();
        let now = Utc::now();
        locks.start_at("temp_1", 10, now).unwrap();

        let later = now + Duration::seconds(3);
        locks.rehome("temp_1", "N1").unwrap();

        assert_eq!(locks.remaining_at("temp_1", later), 0);
        assert_eq!(locks.remaining_at("N1", later), 7);
    }

    #[test]
    fn test_rehome_missing_is_noop() {
        let locks = countdown();
        locks.rehome("temp_x", "N9").unwrap();
        assert_eq!(locks.remaining("N9"), 0);
    }

    #[test]
    fn test_ensure_unlocked() {
        let locks = countdown();
        locks.start("N1", 30).unwrap();
        let err = locks.ensure_unlocked("N1").unwrap_err();
        assert!(err.is_locked());

        locks.release("N1").unwrap();
        assert!(locks.ensure_unlocked("N1").is_ok());
    }
}
