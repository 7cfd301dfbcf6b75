//! Editor events broadcast to the hosting UI.
//!
//! Failed optimistic actions are reported here so the UI can show a
//! transient notification; the originating call also returns the error.

use serde::Serialize;

/// Action that failed and was rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorAction {
    ToggleChecklist,
    UpdateContent,
    TogglePin,
    UpdateTags,
    LoadNotes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum EditorEvent {
    /// A provisional note was confirmed by the backend
    NoteSaved { temp_id: String, note_id: String },
    /// A save failed and the provisional note was removed
    SaveFailed { temp_id: String, message: String },
    ActionFailed {
        note_id: String,
        action: EditorAction,
        message: String,
    },
    /// Thread view replaced with `sessions` groups
    ThreadLoaded { sessions: usize },
}

impl EditorEvent {
    /// Whether the UI should surface this event as an error toast.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::SaveFailed { .. } | Self::ActionFailed { .. })
    }
}
