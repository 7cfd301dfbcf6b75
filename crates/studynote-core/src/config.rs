//! Editor configuration model.

use crate::error::{NoteError, Result};
use crate::image::DEFAULT_PLACEHOLDER;
use serde::{Deserialize, Serialize};

fn default_save_lock_secs() -> u64 {
    5
}

fn default_temp_id_prefix() -> String {
    "temp_".to_string()
}

fn default_max_pinned() -> usize {
    10
}

fn default_placeholder_image_url() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

fn default_gateway_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings of one editor instance, read from `config.toml`.
///
/// Every field has a default so a partial or missing file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Length of the post-create window during which pin/tag are disabled
    #[serde(default = "default_save_lock_secs")]
    pub save_lock_secs: u64,
    #[serde(default = "default_temp_id_prefix")]
    pub temp_id_prefix: String,
    /// Soft ceiling on simultaneously pinned notes in the current session
    #[serde(default = "default_max_pinned")]
    pub max_pinned: usize,
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,
    /// Backend endpoint for the HTTP gateway
    #[serde(default)]
    pub gateway_endpoint: Option<String>,
    #[serde(default = "default_gateway_timeout_secs")]
    pub gateway_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_lock_secs: default_save_lock_secs(),
            temp_id_prefix: default_temp_id_prefix(),
            max_pinned: default_max_pinned(),
            placeholder_image_url: default_placeholder_image_url(),
            gateway_endpoint: None,
            gateway_timeout_secs: default_gateway_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl EditorConfig {
    /// Longest save-lock window accepted from a config file.
    pub const MAX_SAVE_LOCK_SECS: u64 = 24 * 60 * 60;

    /// Rejects settings the editor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.temp_id_prefix.trim().is_empty() {
            return Err(NoteError::config("temp_id_prefix must not be empty"));
        }
        if self.save_lock_secs > Self::MAX_SAVE_LOCK_SECS {
            return Err(NoteError::config(format!(
                "save_lock_secs must be at most {}",
                Self::MAX_SAVE_LOCK_SECS
            )));
        }
        if self.max_pinned == 0 {
            return Err(NoteError::config("max_pinned must be at least 1"));
        }
        if self.gateway_timeout_secs == 0 {
            return Err(NoteError::config("gateway_timeout_secs must be at least 1"));
        }
        Ok(())
    }
}
