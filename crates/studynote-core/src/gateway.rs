//! Persistence gateway contract.
//!
//! The gateway is the only component that talks to the remote backend. Note
//! content crosses it in encoded form ([`ContentCodec`]); callers decode
//! before display.

use crate::content::ContentCodec;
use crate::error::Result;
use crate::image::ImageResolver;
use crate::note::{NoteCard, NoteTitle, PinState};
use crate::session::{SessionContext, SubjectQuery, ThreadSession};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note as stored by the backend, with encoded content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNote {
    pub note_id: String,
    #[serde(default)]
    pub session_id: String,
    pub note_title: String,
    pub note_content: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_pinned: PinState,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RemoteNote {
    /// Decodes content, recovers the type from the title and resolves images.
    pub fn into_note_card(self, resolver: &ImageResolver) -> NoteCard {
        let (note_type, _) = NoteTitle::parse(&self.note_title);
        NoteCard {
            note_type,
            note_content: ContentCodec::decode(&self.note_content),
            images: resolver.resolve_all(&self.images),
            note_id: self.note_id,
            session_id: self.session_id,
            note_title: self.note_title,
            timestamp: self.timestamp,
            is_pinned: self.is_pinned,
            tags: self.tags,
        }
    }
}

/// A session group returned by the subject query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteThreadSession {
    pub session_id: String,
    pub session_name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    pub batch: String,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub notes: Vec<RemoteNote>,
}

impl RemoteThreadSession {
    pub fn into_thread_session(self, resolver: &ImageResolver) -> ThreadSession {
        let session_id = self.session_id;
        let notes = self
            .notes
            .into_iter()
            .map(|note| {
                let mut card = note.into_note_card(resolver);
                if card.session_id.is_empty() {
                    card.session_id = session_id.clone();
                }
                card
            })
            .collect();
        ThreadSession {
            session_id,
            session_name: self.session_name,
            date: self.date,
            start_time: self.start_time,
            batch: self.batch,
            term: self.term,
            domain: self.domain,
            subject: self.subject,
            notes,
        }
    }
}

/// Parameters of a note save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveNoteRequest {
    pub student_id: String,
    pub session_id: String,
    pub title: String,
    pub encoded_content: String,
    pub images: Vec<String>,
    pub session: SessionContext,
}

/// Server acknowledgement of a saved note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedNote {
    pub note_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Remote procedure surface consumed by the editor.
///
/// Implementations own transport concerns (authentication, timeouts) and
/// report every remote failure as `NoteError::Persistence`.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Stores a new note and returns its durable id and creation time.
    async fn save_note(&self, request: &SaveNoteRequest) -> Result<SavedNote>;

    /// Lists the student's notes for one session.
    async fn list_notes(&self, student_id: &str, session_id: &str) -> Result<Vec<RemoteNote>>;

    /// Lists the student's notes for every session of a subject, grouped by
    /// session. May include the caller's current session.
    async fn list_notes_by_subject(
        &self,
        student_id: &str,
        query: &SubjectQuery,
    ) -> Result<Vec<RemoteThreadSession>>;

    /// Flips the pin flag and returns the stored value.
    async fn toggle_pin(&self, student_id: &str, note_id: &str) -> Result<PinState>;

    /// Replaces the tag set and returns the stored tags.
    async fn update_tags(&self, student_id: &str, note_id: &str, tags: &[String])
    -> Result<Vec<String>>;

    /// Replaces the note body and returns the stored (encoded) content.
    async fn update_content(
        &self,
        student_id: &str,
        note_id: &str,
        encoded_content: &str,
    ) -> Result<String>;
}
