//! Note card domain model.

use crate::content::RichText;
use crate::error::{NoteError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// The fixed catalogue of note card types.
///
/// The string form is what appears as the title prefix and on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum NoteType {
    Topic,
    Question,
    Pointers,
    #[serde(rename = "To-Do List")]
    #[strum(serialize = "To-Do List")]
    TodoList,
    Keywords,
    Important,
}

impl NoteType {
    /// Display label, identical to the title prefix.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Topic => "Topic",
            Self::Question => "Question",
            Self::Pointers => "Pointers",
            Self::TodoList => "To-Do List",
            Self::Keywords => "Keywords",
            Self::Important => "Important",
        }
    }

    /// Default accent color of the card.
    pub fn accent_color(&self) -> &'static str {
        match self {
            Self::Topic => "#3b82f6",
            Self::Question => "#8b5cf6",
            Self::Pointers => "#10b981",
            Self::TodoList => "#f59e0b",
            Self::Keywords => "#06b6d4",
            Self::Important => "#ef4444",
        }
    }

    /// Icon name shown on the card header.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Topic => "book-open",
            Self::Question => "help-circle",
            Self::Pointers => "list",
            Self::TodoList => "check-square",
            Self::Keywords => "key",
            Self::Important => "alert-triangle",
        }
    }

    /// To-Do List notes render their list items as toggleable lines.
    pub fn is_checklist(&self) -> bool {
        matches!(self, Self::TodoList)
    }
}

/// Composite `"<type>: <text>"` titles.
pub struct NoteTitle;

impl NoteTitle {
    /// Builds a title; the bare type label when `text` is blank.
    pub fn compose(note_type: NoteType, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            note_type.label().to_string()
        } else {
            format!("{}: {}", note_type.label(), text)
        }
    }

    /// Splits a title back into its type and free text.
    ///
    /// Titles without a known type prefix are treated as `Topic` notes whose
    /// free text is the whole title.
    pub fn parse(title: &str) -> (NoteType, String) {
        for note_type in NoteType::iter() {
            let label = note_type.label();
            if title == label {
                return (note_type, String::new());
            }
            if let Some(rest) = title.strip_prefix(label)
                && let Some(text) = rest.strip_prefix(':')
            {
                return (note_type, text.trim().to_string());
            }
        }
        (NoteType::Topic, title.trim().to_string())
    }
}

/// Pin flag, carried as `Yes`/`No` on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinState {
    Yes,
    #[default]
    No,
}

impl PinState {
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Yes)
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

impl From<bool> for PinState {
    fn from(pinned: bool) -> Self {
        if pinned { Self::Yes } else { Self::No }
    }
}

/// One discrete, typed, timestamped note entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCard {
    /// Temporary token while provisional, server id once confirmed
    pub note_id: String,
    /// Session the note was written in
    pub session_id: String,
    pub note_type: NoteType,
    pub note_title: String,
    pub note_content: RichText,
    pub images: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub is_pinned: PinState,
    pub tags: Vec<String>,
}

impl NoteCard {
    /// Free text part of the title.
    pub fn title_text(&self) -> String {
        NoteTitle::parse(&self.note_title).1
    }

    pub fn is_checklist(&self) -> bool {
        self.note_type.is_checklist()
    }
}

/// Orders notes for display: pinned first, then newest first.
pub fn sort_for_display(notes: &mut [NoteCard]) {
    notes.sort_by_key(|note| (!note.is_pinned.is_pinned(), Reverse(note.timestamp)));
}

/// What the student typed before pressing save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub note_type: NoteType,
    /// Free text; the composite title is built on save
    pub title_text: String,
    pub content: RichText,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NoteDraft {
    pub fn new(note_type: NoteType, title_text: impl Into<String>, content: RichText) -> Self {
        Self {
            note_type,
            title_text: title_text.into(),
            content,
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    pub fn title(&self) -> String {
        NoteTitle::compose(self.note_type, &self.title_text)
    }

    /// Rejects drafts with no title text, no content and no images.
    pub fn validate(&self) -> Result<()> {
        if self.title_text.trim().is_empty() && self.content.is_blank() && self.images.is_empty()
        {
            return Err(NoteError::validation(
                "Write a title or some content before saving",
            ));
        }
        Ok(())
    }
}
