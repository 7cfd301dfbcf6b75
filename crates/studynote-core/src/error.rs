//! Error types for the Studynote editor core.

use thiserror::Error;

/// A shared error type for the whole note editor.
///
/// The first three variants form the user-facing taxonomy: validation errors
/// block an action before any network call, persistence errors trigger a local
/// rollback, and not-found errors are benign no-ops for reconciliation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoteError {
    /// Input rejected locally (empty tag buffer, empty note, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote call failed (network, backend rejection, malformed response)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Action rejected while the note's save-lock window is still open
    #[error("Note '{note_id}' is locked for another {remaining_secs}s")]
    Locked { note_id: String, remaining_secs: u64 },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NoteError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Locked error
    pub fn locked(note_id: impl Into<String>, remaining_secs: u64) -> Self {
        Self::Locked {
            note_id: note_id.into(),
            remaining_secs,
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Persistence error
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Locked error
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    /// Whether the error should be shown to the student as a transient toast.
    ///
    /// Not-found errors come from reconciling notes that were already rolled
    /// back and are never surfaced.
    pub fn is_user_visible(&self) -> bool {
        !self.is_not_found()
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for NoteError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for NoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for NoteError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for NoteError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, NoteError>`.
pub type Result<T> = std::result::Result<T, NoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_user_visible() {
        let err = NoteError::not_found("NoteCard", "temp_1");
        assert!(err.is_not_found());
        assert!(!err.is_user_visible());
        assert_eq!(err.to_string(), "Entity not found: NoteCard 'temp_1'");
    }

    #[test]
    fn test_locked_message() {
        let err = NoteError::locked("N1", 4);
        assert!(err.is_locked());
        assert_eq!(err.to_string(), "Note 'N1' is locked for another 4s");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: NoteError = io.into();
        assert!(matches!(err, NoteError::Io { .. }));
    }
}
