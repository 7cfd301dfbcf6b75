//! Path management for studynote files.

use std::path::PathBuf;
use studynote_core::error::{NoteError, Result};

const APP_DIR: &str = "studynote";

/// Resolves where studynote keeps its files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/studynote/          # Config directory
/// └── config.toml               # Editor configuration
///
/// ~/.local/share/studynote/     # Data directory
/// └── save_locks.toml           # Save-lock expiries
/// ```
///
/// A custom base replaces both roots, which tests use with a temp dir.
#[derive(Debug, Clone, Default)]
pub struct StudynotePaths {
    base: Option<PathBuf>,
}

impl StudynotePaths {
    /// Platform default locations (XDG on Linux).
    pub fn new() -> Self {
        Self { base: None }
    }

    /// Keeps every file under `base`.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| NoteError::config("Cannot find the config directory")),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| NoteError::config("Cannot find the data directory")),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn save_lock_file(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("save_locks.toml"))
    }
}
