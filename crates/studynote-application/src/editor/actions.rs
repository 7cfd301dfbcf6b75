//! Optimistic per-note actions.
//!
//! Every action applies its change locally, stamps the write in the store
//! and sends one request. The response settles the field (the server value
//! on success, the previous value on failure) only while that stamp is still
//! the newest write of the field, so a late response never undoes a newer
//! edit, even one that restored an earlier value.

use super::note_editor::NoteEditor;
use crate::events::EditorAction;
use crate::store::{NoteField, NoteLocation, NoteStore};
use std::mem;
use studynote_core::content::{ContentCodec, RichText, checklist};
use studynote_core::error::{NoteError, Result};
use studynote_core::note::{NoteCard, PinState, TagBuffer};

/// Runs `apply` on the note only while `seq` is its newest write of `field`.
fn settle(
    store: &mut NoteStore,
    note_id: &str,
    field: NoteField,
    seq: u64,
    apply: impl FnOnce(&mut NoteCard),
) -> bool {
    if !store.is_latest_write(note_id, field, seq) {
        tracing::debug!(
            "[NoteEditor] {:?} of {} has a newer write, response ignored",
            field,
            note_id
        );
        return false;
    }
    match store.get_mut(note_id) {
        Some(note) => {
            apply(note);
            true
        }
        None => false,
    }
}

/// Rejects notes that cannot take a remote edit yet (or at all).
fn check_editable(store: &NoteStore, note_id: &str, allow_thread: bool) -> Result<()> {
    match store.locate(note_id) {
        None => Err(NoteError::not_found("Note", note_id)),
        Some(_) if store.is_provisional(note_id) => Err(NoteError::validation(
            "This note is still being saved, try again in a moment",
        )),
        Some(NoteLocation::Thread { .. }) if !allow_thread => Err(NoteError::validation(
            "Notes from earlier sessions are read-only",
        )),
        Some(_) => Ok(()),
    }
}

impl NoteEditor {
    /// Flips one checklist line of a To-Do List note and persists the body.
    ///
    /// Works for current-session and thread notes.
    pub async fn toggle_checklist_line(&self, note_id: &str, line_index: usize) -> Result<NoteCard> {
        let (seq, before, after) = {
            let mut store = self.store.write().await;
            check_editable(&store, note_id, true)?;
            let note = store
                .get_mut(note_id)
                .ok_or_else(|| NoteError::not_found("Note", note_id))?;
            if !note.is_checklist() {
                return Err(NoteError::validation(
                    "Only To-Do List notes have checklist lines",
                ));
            }

            let (toggled, state) = checklist::toggle_line(&note.note_content, line_index)?;
            tracing::debug!(
                "[NoteEditor] Line {} of {} is now {:?}",
                line_index,
                note_id,
                state
            );
            let before = mem::replace(&mut note.note_content, toggled.clone());
            (store.stamp_write(note_id, NoteField::Content), before, toggled)
        };

        self.persist_content(note_id, seq, before, after, EditorAction::ToggleChecklist)
            .await
    }

    /// Replaces the body of a current-session note.
    pub async fn update_content(&self, note_id: &str, content: RichText) -> Result<NoteCard> {
        let (seq, before) = {
            let mut store = self.store.write().await;
            check_editable(&store, note_id, false)?;
            let note = store
                .get_mut(note_id)
                .ok_or_else(|| NoteError::not_found("Note", note_id))?;
            let before = mem::replace(&mut note.note_content, content.clone());
            (store.stamp_write(note_id, NoteField::Content), before)
        };

        self.persist_content(note_id, seq, before, content, EditorAction::UpdateContent)
            .await
    }

    async fn persist_content(
        &self,
        note_id: &str,
        seq: u64,
        before: RichText,
        after: RichText,
        action: EditorAction,
    ) -> Result<NoteCard> {
        let encoded = ContentCodec::encode(&after);
        let outcome = self
            .gateway
            .update_content(&self.student.student_id, note_id, &encoded)
            .await;

        match outcome {
            Ok(stored) => {
                let stored = if stored.is_empty() {
                    after
                } else {
                    ContentCodec::decode(&stored)
                };
                let mut store = self.store.write().await;
                settle(&mut store, note_id, NoteField::Content, seq, |note| {
                    note.note_content = stored;
                });
                store
                    .get(note_id)
                    .cloned()
                    .ok_or_else(|| NoteError::not_found("Note", note_id))
            }
            Err(e) => {
                {
                    let mut store = self.store.write().await;
                    settle(&mut store, note_id, NoteField::Content, seq, |note| {
                        note.note_content = before;
                    });
                }
                self.report_failure(note_id, action, &e);
                Err(e)
            }
        }
    }

    /// Flips the pin flag of a current-session note.
    ///
    /// # Errors
    ///
    /// - `NoteError::Locked` while the save-lock window is open
    /// - `NoteError::Validation` when pinning would exceed `max_pinned`
    /// - the gateway error after rolling the flag back
    pub async fn toggle_pin(&self, note_id: &str) -> Result<PinState> {
        let (seq, previous) = {
            let mut store = self.store.write().await;
            check_editable(&store, note_id, false)?;
            self.locks.ensure_unlocked(note_id)?;

            let pinned = store.pinned_count();
            let max_pinned = self.config.max_pinned;
            let note = store
                .get_mut(note_id)
                .ok_or_else(|| NoteError::not_found("Note", note_id))?;
            let optimistic = note.is_pinned.toggled();
            if optimistic.is_pinned() && pinned >= max_pinned {
                return Err(NoteError::validation(format!(
                    "You can pin at most {} notes",
                    max_pinned
                )));
            }
            let previous = mem::replace(&mut note.is_pinned, optimistic);
            (store.stamp_write(note_id, NoteField::Pin), previous)
        };

        let outcome = self
            .gateway
            .toggle_pin(&self.student.student_id, note_id)
            .await;

        let mut store = self.store.write().await;
        match outcome {
            Ok(stored) => {
                settle(&mut store, note_id, NoteField::Pin, seq, |note| {
                    note.is_pinned = stored;
                });
                Ok(stored)
            }
            Err(e) => {
                settle(&mut store, note_id, NoteField::Pin, seq, |note| {
                    note.is_pinned = previous;
                });
                drop(store);
                self.report_failure(note_id, EditorAction::TogglePin, &e);
                Err(e)
            }
        }
    }

    /// Opens a tag buffer seeded with the note's current tags.
    pub async fn propose_tags(&self, note_id: &str) -> Result<TagBuffer> {
        let store = self.store.read().await;
        let note = store
            .get(note_id)
            .ok_or_else(|| NoteError::not_found("Note", note_id))?;
        Ok(TagBuffer::propose(&note.tags))
    }

    /// Persists a tag buffer onto a note in the current session or thread.
    ///
    /// An empty buffer is rejected before anything is sent.
    pub async fn commit_tags(&self, note_id: &str, buffer: &TagBuffer) -> Result<Vec<String>> {
        let tags = buffer.validated()?;

        let (seq, previous) = {
            let mut store = self.store.write().await;
            check_editable(&store, note_id, true)?;
            self.locks.ensure_unlocked(note_id)?;
            let note = store
                .get_mut(note_id)
                .ok_or_else(|| NoteError::not_found("Note", note_id))?;
            let previous = mem::replace(&mut note.tags, tags.clone());
            (store.stamp_write(note_id, NoteField::Tags), previous)
        };

        let outcome = self
            .gateway
            .update_tags(&self.student.student_id, note_id, &tags)
            .await;

        let mut store = self.store.write().await;
        match outcome {
            Ok(stored) => {
                settle(&mut store, note_id, NoteField::Tags, seq, |note| {
                    note.tags = stored.clone();
                });
                Ok(stored)
            }
            Err(e) => {
                settle(&mut store, note_id, NoteField::Tags, seq, |note| {
                    note.tags = previous;
                });
                drop(store);
                self.report_failure(note_id, EditorAction::UpdateTags, &e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use studynote_core::note::NoteType;

    fn store_with(tags: &[&str]) -> NoteStore {
        let mut store = NoteStore::new("temp_");
        store.replace_session_notes(vec![NoteCard {
            note_id: "N1".to_string(),
            session_id: "S1".to_string(),
            note_type: NoteType::Topic,
            note_title: "Topic: t".to_string(),
            note_content: RichText::default(),
            images: Vec::new(),
            timestamp: Utc::now(),
            is_pinned: PinState::No,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }]);
        store
    }

    #[test]
    fn test_settle_skips_superseded_write_with_equal_value() {
        let mut store = store_with(&["Exam"]);
        let first = store.stamp_write("N1", NoteField::Tags);
        // A newer write that lands on the same value still supersedes
        let second = store.stamp_write("N1", NoteField::Tags);

        assert!(!settle(&mut store, "N1", NoteField::Tags, first, |note| {
            note.tags.clear();
        }));
        assert_eq!(store.get("N1").unwrap().tags, vec!["Exam".to_string()]);

        assert!(settle(&mut store, "N1", NoteField::Tags, second, |note| {
            note.tags = vec!["Doubt".to_string()];
        }));
        assert_eq!(store.get("N1").unwrap().tags, vec!["Doubt".to_string()]);
    }

    #[test]
    fn test_settle_of_missing_note_is_noop() {
        let mut store = store_with(&[]);
        let seq = store.stamp_write("N9", NoteField::Pin);
        assert!(!settle(&mut store, "N9", NoteField::Pin, seq, |_| {}));
    }
}
