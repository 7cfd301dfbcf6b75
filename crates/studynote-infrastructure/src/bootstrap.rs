//! Wiring of the editor's infrastructure from the config file.

use crate::config_service::ConfigService;
use crate::gateway::{HttpGateway, InMemoryGateway};
use crate::logging::init_tracing;
use crate::paths::StudynotePaths;
use crate::save_lock_store::FileSaveLockStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use studynote_core::config::EditorConfig;
use studynote_core::gateway::PersistenceGateway;
use studynote_core::save_lock::SaveLockStore;

/// Everything a note editor needs besides the session and student.
pub struct EditorEnvironment {
    pub config: EditorConfig,
    pub gateway: Arc<dyn PersistenceGateway>,
    pub lock_store: Arc<dyn SaveLockStore>,
}

impl EditorEnvironment {
    /// Loads `config.toml`, installs logging and opens the save-lock file.
    ///
    /// Without a `gateway_endpoint` the editor runs against an in-process
    /// backend.
    pub fn load(paths: &StudynotePaths) -> Result<Self> {
        let config = ConfigService::new(paths)
            .context("Failed to resolve config path")?
            .load()
            .context("Failed to load editor config")?;

        init_tracing(&config.log_level);

        let gateway: Arc<dyn PersistenceGateway> = if config.gateway_endpoint.is_some() {
            Arc::new(HttpGateway::from_config(&config).context("Invalid gateway settings")?)
        } else {
            tracing::warn!("[Bootstrap] No gateway_endpoint configured, notes stay in memory");
            Arc::new(InMemoryGateway::new())
        };

        let lock_store = Arc::new(
            FileSaveLockStore::open(paths).context("Failed to open save-lock file")?,
        );

        Ok(Self {
            config,
            gateway,
            lock_store,
        })
    }
}
