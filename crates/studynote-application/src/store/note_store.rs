//! In-memory note collection of one editor instance.

use super::temp_id::TempIdGenerator;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use studynote_core::error::{NoteError, Result};
use studynote_core::gateway::SavedNote;
use studynote_core::note::{NoteCard, NoteDraft, PinState, sort_for_display};
use studynote_core::session::ThreadSession;

/// Where a note lives inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteLocation {
    /// Current session collection
    Current,
    /// Read-only thread group of an earlier session
    Thread { session_id: String },
}

/// Note fields that take optimistic writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Content,
    Pin,
    Tags,
}

/// Notes of the active session plus the loaded thread sessions.
///
/// The store performs no I/O. Provisional notes carry a temporary id until
/// [`NoteStore::confirm`] swaps it for the server id, or until
/// [`NoteStore::rollback`] removes them.
#[derive(Debug, Default)]
pub struct NoteStore {
    notes: Vec<NoteCard>,
    threads: Vec<ThreadSession>,
    temp_ids: TempIdGenerator,
    provisional: HashSet<String>,
    /// Sequence of the newest optimistic write per note field
    write_seqs: HashMap<(String, NoteField), u64>,
    next_seq: u64,
}

impl NoteStore {
    pub fn new(temp_id_prefix: impl Into<String>) -> Self {
        Self {
            notes: Vec::new(),
            threads: Vec::new(),
            temp_ids: TempIdGenerator::new(temp_id_prefix),
            provisional: HashSet::new(),
            write_seqs: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Inserts a provisional card at the head of the current collection.
    pub fn create_provisional(&mut self, draft: &NoteDraft, session_id: &str) -> NoteCard {
        let temp_id = self.temp_ids.next_id();
        let card = NoteCard {
            note_id: temp_id.clone(),
            session_id: session_id.to_string(),
            note_type: draft.note_type,
            note_title: draft.title(),
            note_content: draft.content.clone(),
            images: draft.images.clone(),
            timestamp: Utc::now(),
            is_pinned: PinState::No,
            tags: Vec::new(),
        };

        tracing::debug!("[NoteStore] Created provisional note {}", temp_id);
        self.provisional.insert(temp_id);
        self.notes.insert(0, card.clone());
        card
    }

    /// Rehomes a provisional note onto its server id.
    ///
    /// Returns `NoteError::NotFound` when the temporary id is no longer held,
    /// which callers treat as a no-op.
    pub fn confirm(&mut self, temp_id: &str, saved: &SavedNote) -> Result<NoteCard> {
        if !self.provisional.remove(temp_id) {
            return Err(NoteError::not_found("ProvisionalNote", temp_id));
        }
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.note_id == temp_id)
            .ok_or_else(|| NoteError::not_found("ProvisionalNote", temp_id))?;

        note.note_id = saved.note_id.clone();
        note.timestamp = saved.timestamp;
        tracing::debug!("[NoteStore] Confirmed {} as {}", temp_id, saved.note_id);
        Ok(note.clone())
    }

    /// Removes a provisional note. Returns the removed card.
    pub fn rollback(&mut self, temp_id: &str) -> Result<NoteCard> {
        if !self.provisional.remove(temp_id) {
            return Err(NoteError::not_found("ProvisionalNote", temp_id));
        }
        let index = self
            .notes
            .iter()
            .position(|n| n.note_id == temp_id)
            .ok_or_else(|| NoteError::not_found("ProvisionalNote", temp_id))?;

        tracing::debug!("[NoteStore] Rolled back provisional note {}", temp_id);
        Ok(self.notes.remove(index))
    }

    /// Current session notes, pinned first then newest first.
    pub fn list_for_display(&self) -> Vec<NoteCard> {
        let mut notes = self.notes.clone();
        sort_for_display(&mut notes);
        notes
    }

    /// Finds a note in the current collection, then in the thread groups.
    pub fn get(&self, note_id: &str) -> Option<&NoteCard> {
        self.notes
            .iter()
            .find(|n| n.note_id == note_id)
            .or_else(|| self.threads.iter().find_map(|t| t.find_note(note_id)))
    }

    pub fn get_mut(&mut self, note_id: &str) -> Option<&mut NoteCard> {
        if let Some(index) = self.notes.iter().position(|n| n.note_id == note_id) {
            return self.notes.get_mut(index);
        }
        self.threads
            .iter_mut()
            .find_map(|t| t.find_note_mut(note_id))
    }

    pub fn locate(&self, note_id: &str) -> Option<NoteLocation> {
        if self.notes.iter().any(|n| n.note_id == note_id) {
            return Some(NoteLocation::Current);
        }
        self.threads
            .iter()
            .find(|t| t.find_note(note_id).is_some())
            .map(|t| NoteLocation::Thread {
                session_id: t.session_id.clone(),
            })
    }

    /// Replaces the confirmed notes of the current session.
    ///
    /// Provisional notes still waiting for their save stay in place.
    pub fn replace_session_notes(&mut self, notes: Vec<NoteCard>) {
        let provisional = &self.provisional;
        self.notes.retain(|n| provisional.contains(&n.note_id));
        self.notes.extend(notes);
    }

    pub fn set_threads(&mut self, threads: Vec<ThreadSession>) {
        self.threads = threads;
    }

    pub fn threads(&self) -> &[ThreadSession] {
        &self.threads
    }

    /// Number of notes in the current session.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn is_provisional(&self, note_id: &str) -> bool {
        self.provisional.contains(note_id)
    }

    /// Records an optimistic write of `field` and returns its sequence.
    ///
    /// Sequences grow monotonically across the store, so a response can
    /// tell whether a newer write happened while its request was in flight,
    /// even when that write restored an earlier value.
    pub fn stamp_write(&mut self, note_id: &str, field: NoteField) -> u64 {
        self.next_seq += 1;
        self.write_seqs.insert((note_id.to_string(), field), self.next_seq);
        self.next_seq
    }

    /// Whether `seq` is still the newest write of `field` on the note.
    pub fn is_latest_write(&self, note_id: &str, field: NoteField, seq: u64) -> bool {
        self.write_seqs
            .get(&(note_id.to_string(), field))
            .is_some_and(|latest| *latest == seq)
    }

    /// Pinned notes in the current session.
    pub fn pinned_count(&self) -> usize {
        self.notes
            .iter()
            .filter(|n| n.is_pinned.is_pinned())
            .count()
    }
}
