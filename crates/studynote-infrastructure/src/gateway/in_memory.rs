//! In-process persistence backend.
//!
//! Behaves like the remote note service: it assigns `N<n>` ids, stores
//! encoded content as given and groups notes by session for subject
//! queries. Used by tests and demos.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use studynote_core::error::{NoteError, Result};
use studynote_core::gateway::{
    PersistenceGateway, RemoteNote, RemoteThreadSession, SaveNoteRequest, SavedNote,
};
use studynote_core::note::PinState;
use studynote_core::session::{SessionContext, SubjectQuery};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredNote {
    student_id: String,
    note: RemoteNote,
}

#[derive(Debug, Default)]
struct BackendState {
    next_id: u64,
    notes: Vec<StoredNote>,
    /// Session metadata in registration order
    sessions: Vec<SessionContext>,
}

impl BackendState {
    fn register_session(&mut self, session: &SessionContext) {
        if !self
            .sessions
            .iter()
            .any(|s| s.session_id == session.session_id)
        {
            self.sessions.push(session.clone());
        }
    }

    fn find_note_mut(&mut self, student_id: &str, note_id: &str) -> Result<&mut RemoteNote> {
        self.notes
            .iter_mut()
            .find(|n| n.student_id == student_id && n.note.note_id == note_id)
            .map(|n| &mut n.note)
            .ok_or_else(|| NoteError::persistence(format!("Note {} does not exist", note_id)))
    }
}

/// Note backend held in memory.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: RwLock<BackendState>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `NoteError::Persistence`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of gateway calls received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Stores a note directly, e.g. to seed earlier sessions of a thread.
    pub async fn seed_note(&self, student_id: &str, session: &SessionContext, mut note: RemoteNote) {
        let mut state = self.state.write().await;
        state.register_session(session);
        if note.session_id.is_empty() {
            note.session_id = session.session_id.clone();
        }
        state.notes.push(StoredNote {
            student_id: student_id.to_string(),
            note,
        });
    }

    /// Registers a session that has no notes yet.
    pub async fn seed_session(&self, session: &SessionContext) {
        self.state.write().await.register_session(session);
    }

    /// The stored copy of a note.
    pub async fn note(&self, note_id: &str) -> Option<RemoteNote> {
        self.state
            .read()
            .await
            .notes
            .iter()
            .find(|n| n.note.note_id == note_id)
            .map(|n| n.note.clone())
    }

    fn begin_call(&self, action: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            tracing::debug!("[InMemoryGateway] Rejecting {} while offline", action);
            return Err(NoteError::persistence(format!(
                "{} failed: backend unreachable",
                action
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn save_note(&self, request: &SaveNoteRequest) -> Result<SavedNote> {
        self.begin_call("saveNote")?;

        let mut state = self.state.write().await;
        state.next_id += 1;
        let saved = SavedNote {
            note_id: format!("N{}", state.next_id),
            timestamp: Utc::now(),
        };
        state.register_session(&request.session);
        state.notes.push(StoredNote {
            student_id: request.student_id.clone(),
            note: RemoteNote {
                note_id: saved.note_id.clone(),
                session_id: request.session_id.clone(),
                note_title: request.title.clone(),
                note_content: request.encoded_content.clone(),
                images: request.images.clone(),
                timestamp: saved.timestamp,
                is_pinned: PinState::No,
                tags: Vec::new(),
            },
        });

        tracing::debug!("[InMemoryGateway] Saved {}", saved.note_id);
        Ok(saved)
    }

    async fn list_notes(&self, student_id: &str, session_id: &str) -> Result<Vec<RemoteNote>> {
        self.begin_call("listNotes")?;

        let state = self.state.read().await;
        Ok(state
            .notes
            .iter()
            .filter(|n| n.student_id == student_id && n.note.session_id == session_id)
            .map(|n| n.note.clone())
            .collect())
    }

    async fn list_notes_by_subject(
        &self,
        student_id: &str,
        query: &SubjectQuery,
    ) -> Result<Vec<RemoteThreadSession>> {
        self.begin_call("listNotesBySubject")?;

        let state = self.state.read().await;
        let mut by_session: HashMap<&str, Vec<RemoteNote>> = HashMap::new();
        for stored in state.notes.iter().filter(|n| n.student_id == student_id) {
            by_session
                .entry(stored.note.session_id.as_str())
                .or_default()
                .push(stored.note.clone());
        }

        Ok(state
            .sessions
            .iter()
            .filter(|session| query.matches(session))
            .map(|session| RemoteThreadSession {
                session_id: session.session_id.clone(),
                session_name: session.session_name.clone(),
                date: session.date.clone(),
                start_time: session.start_time.clone(),
                batch: session.batch.clone(),
                term: session.term.clone(),
                domain: session.domain.clone(),
                subject: session.subject.clone(),
                notes: by_session
                    .remove(session.session_id.as_str())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn toggle_pin(&self, student_id: &str, note_id: &str) -> Result<PinState> {
        self.begin_call("togglePin")?;

        let mut state = self.state.write().await;
        let note = state.find_note_mut(student_id, note_id)?;
        note.is_pinned = note.is_pinned.toggled();
        Ok(note.is_pinned)
    }

    async fn update_tags(
        &self,
        student_id: &str,
        note_id: &str,
        tags: &[String],
    ) -> Result<Vec<String>> {
        self.begin_call("updateTags")?;

        let mut state = self.state.write().await;
        let note = state.find_note_mut(student_id, note_id)?;
        note.tags = tags.to_vec();
        Ok(note.tags.clone())
    }

    async fn update_content(
        &self,
        student_id: &str,
        note_id: &str,
        encoded_content: &str,
    ) -> Result<String> {
        self.begin_call("updateContent")?;

        let mut state = self.state.write().await;
        let note = state.find_note_mut(student_id, note_id)?;
        note.note_content = encoded_content.to_string();
        Ok(note.note_content.clone())
    }
}
