//! Configuration service implementation.
//!
//! Loads `EditorConfig` from `config.toml` (see [`StudynotePaths`]) and
//! caches it.

use crate::paths::StudynotePaths;
use crate::storage::AtomicTomlFile;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use studynote_core::config::EditorConfig;
use studynote_core::error::Result;

/// Loads and caches the editor configuration.
#[derive(Clone)]
pub struct ConfigService {
    file: Arc<AtomicTomlFile<EditorConfig>>,
    config: Arc<RwLock<Option<EditorConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &StudynotePaths) -> Result<Self> {
        Ok(Self::with_file(paths.config_file()?))
    }

    pub fn with_file(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads the file, writing the defaults first when it does not exist.
    pub fn load(&self) -> Result<EditorConfig> {
        let config = match self.file.load()? {
            Some(config) => config,
            None => {
                tracing::info!(
                    "[ConfigService] Creating default config at {}",
                    self.file.path().display()
                );
                let config = EditorConfig::default();
                self.file.save(&config)?;
                config
            }
        };
        config.validate()?;

        self.store_cache(Some(config.clone()));
        Ok(config)
    }

    /// Cached configuration; falls back to defaults when loading fails.
    pub fn get_config(&self) -> EditorConfig {
        if let Some(cached) = self.cached() {
            return cached;
        }
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("[ConfigService] Using default config: {}", e);
                EditorConfig::default()
            }
        }
    }

    pub fn save(&self, config: &EditorConfig) -> Result<()> {
        config.validate()?;
        self.file.save(config)?;
        self.store_cache(Some(config.clone()));
        Ok(())
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        self.store_cache(None);
    }

    fn cached(&self) -> Option<EditorConfig> {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store_cache(&self, value: Option<EditorConfig>) {
        match self.config.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}
