use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use studynote_application::{EditorAction, EditorEvent, NoteEditor};
use studynote_core::config::EditorConfig;
use studynote_core::content::checklist::line_states;
use studynote_core::content::{ContentCodec, LineState, RichText};
use studynote_core::error::{NoteError, Result};
use studynote_core::gateway::{
    PersistenceGateway, RemoteNote, RemoteThreadSession, SaveNoteRequest, SavedNote,
};
use studynote_core::note::{NoteDraft, NoteType, PinState, TagAddOutcome};
use studynote_core::session::{SessionContext, StudentIdentity, SubjectQuery};
use studynote_infrastructure::{InMemoryGateway, InMemorySaveLockStore};
use tokio::sync::Notify;

fn session() -> SessionContext {
    SessionContext::new("S2", "Lecture 2", "B24")
        .with_subject("T1", "CS", "Algo")
        .with_schedule("2024-05-08", "10:00")
}

fn student() -> StudentIdentity {
    StudentIdentity::new("STU-1", "Jane Doe")
}

fn config(save_lock_secs: u64) -> EditorConfig {
    EditorConfig {
        save_lock_secs,
        ..EditorConfig::default()
    }
}

fn editor_with(gateway: Arc<dyn PersistenceGateway>, config: EditorConfig) -> NoteEditor {
    NoteEditor::new(
        gateway,
        Arc::new(InMemorySaveLockStore::new()),
        session(),
        student(),
        config,
    )
}

fn todo_draft() -> NoteDraft {
    NoteDraft::new(
        NoteType::TodoList,
        "homework",
        RichText::bullet_list(["read ch. 4", "solve 4.2"]),
    )
}

#[tokio::test]
async fn test_save_confirms_provisional_note() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(5));
    let mut events = editor.subscribe();

    let provisional = editor.begin_save(todo_draft()).await.unwrap();
    assert!(provisional.note_id.starts_with("temp_"));
    assert_eq!(editor.notes_for_display().await.len(), 1);
    assert!(editor.save_lock_remaining(&provisional.note_id) > 0);

    let card = editor.complete_save(provisional.clone()).await.unwrap();
    assert_eq!(card.note_id, "N1");
    assert_eq!(card.note_title, "To-Do List: homework");
    assert_eq!(gateway.call_count(), 1, "one round trip per save");

    // The lock followed the note to its server id
    assert_eq!(editor.save_lock_remaining(&provisional.note_id), 0);
    assert!(editor.save_lock_remaining("N1") > 0);

    let notes = editor.notes_for_display().await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].note_id, "N1");

    assert_eq!(
        events.try_recv().unwrap(),
        EditorEvent::NoteSaved {
            temp_id: provisional.note_id,
            note_id: "N1".to_string(),
        }
    );

    let stored = gateway.note("N1").await.unwrap();
    assert_eq!(
        ContentCodec::decode(&stored.note_content),
        RichText::bullet_list(["read ch. 4", "solve 4.2"])
    );
}

#[tokio::test]
async fn test_failed_save_rolls_back() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(5));
    editor
        .save_note(NoteDraft::new(NoteType::Topic, "kept", RichText::paragraph("x")))
        .await
        .unwrap();
    let mut events = editor.subscribe();
    let before = editor.notes_for_display().await.len();

    gateway.set_offline(true);
    let provisional = editor
        .begin_save(NoteDraft::new(NoteType::Question, "lost?", RichText::default()))
        .await
        .unwrap();
    let err = editor.complete_save(provisional.clone()).await.unwrap_err();

    assert!(err.is_persistence());
    assert_eq!(editor.notes_for_display().await.len(), before);
    assert!(editor.note(&provisional.note_id).await.is_none());
    assert_eq!(editor.save_lock_remaining(&provisional.note_id), 0);
    assert!(matches!(
        events.try_recv().unwrap(),
        EditorEvent::SaveFailed { temp_id, .. } if temp_id == provisional.note_id
    ));
}

#[tokio::test]
async fn test_empty_draft_never_reaches_gateway() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(5));

    let err = editor
        .save_note(NoteDraft::new(NoteType::Topic, "  ", RichText::paragraph(" ")))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(gateway.call_count(), 0);
    assert!(editor.notes_for_display().await.is_empty());
}

#[tokio::test]
async fn test_oversized_lock_window_does_not_block_save() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(10_000_000_000_000));

    let card = editor.save_note(todo_draft()).await.unwrap();
    assert_eq!(card.note_id, "N1");
    assert_eq!(editor.save_lock_remaining("N1"), 0);
    assert_eq!(gateway.call_count(), 1);
}

#[tokio::test]
async fn test_spawn_save_returns_provisional_first() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway, config(5));

    let (provisional, handle) = editor.spawn_save(todo_draft()).await.unwrap();
    assert!(provisional.note_id.starts_with("temp_"));

    let card = handle.await.expect("save task panicked").unwrap();
    assert_eq!(card.note_id, "N1");
    assert!(editor.note(&provisional.note_id).await.is_none());
}

#[tokio::test]
async fn test_checklist_double_toggle_restores_content() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(0));

    let card = editor.save_note(todo_draft()).await.unwrap();
    assert_eq!(card.note_id, "N1");
    let confirmed_content = card.note_content.clone();

    let toggled = editor.toggle_checklist_line("N1", 0).await.unwrap();
    assert_eq!(
        line_states(&toggled.note_content),
        vec![LineState::Done, LineState::Pending]
    );

    let restored = editor.toggle_checklist_line("N1", 0).await.unwrap();
    assert_eq!(restored.note_content, confirmed_content);

    let stored = gateway.note("N1").await.unwrap();
    assert_eq!(ContentCodec::decode(&stored.note_content), confirmed_content);
}

#[tokio::test]
async fn test_checklist_rules() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(0));
    editor.save_note(todo_draft()).await.unwrap();
    editor
        .save_note(NoteDraft::new(NoteType::Topic, "plain", RichText::bullet_list(["a"])))
        .await
        .unwrap();

    let out_of_range = editor.toggle_checklist_line("N1", 5).await.unwrap_err();
    assert!(out_of_range.is_not_found());

    let not_todo = editor.toggle_checklist_line("N2", 0).await.unwrap_err();
    assert!(not_todo.is_validation());

    let provisional = editor.begin_save(todo_draft()).await.unwrap();
    let in_flight = editor
        .toggle_checklist_line(&provisional.note_id, 0)
        .await
        .unwrap_err();
    assert!(in_flight.is_validation());
}

#[tokio::test]
async fn test_failed_toggle_reverts_and_signals() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(0));
    let card = editor.save_note(todo_draft()).await.unwrap();
    let mut events = editor.subscribe();

    gateway.set_offline(true);
    let err = editor.toggle_checklist_line("N1", 1).await.unwrap_err();
    assert!(err.is_persistence());

    let note = editor.note("N1").await.unwrap();
    assert_eq!(note.note_content, card.note_content);
    assert!(matches!(
        events.try_recv().unwrap(),
        EditorEvent::ActionFailed {
            action: EditorAction::ToggleChecklist,
            ..
        }
    ));
}

#[tokio::test]
async fn test_tag_commit_round_trip() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(0));
    editor
        .save_note(NoteDraft::new(NoteType::Important, "exam", RichText::paragraph("ch 4")))
        .await
        .unwrap();

    let mut buffer = editor.propose_tags("N1").await.unwrap();
    assert!(buffer.is_empty());
    assert_eq!(buffer.add("Exam"), TagAddOutcome::Added);
    assert_eq!(buffer.add("Important"), TagAddOutcome::Added);

    let stored = editor.commit_tags("N1", &buffer).await.unwrap();
    assert_eq!(stored, vec!["Exam".to_string(), "Important".to_string()]);

    let listed = gateway.list_notes("STU-1", "S2").await.unwrap();
    assert_eq!(listed[0].tags, vec!["Exam".to_string(), "Important".to_string()]);
    assert_eq!(editor.note("N1").await.unwrap().tags, stored);
}

#[tokio::test]
async fn test_tag_buffer_bounds() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(0));
    editor
        .save_note(NoteDraft::new(NoteType::Topic, "t", RichText::default()))
        .await
        .unwrap();
    let calls = gateway.call_count();

    let empty = editor.propose_tags("N1").await.unwrap();
    let err = editor.commit_tags("N1", &empty).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(gateway.call_count(), calls, "validation blocks before network");

    let mut buffer = empty;
    for tag in ["Exam", "Doubt", "Formula"] {
        assert_eq!(buffer.add(tag), TagAddOutcome::Added);
    }
    assert_eq!(buffer.add("Revision"), TagAddOutcome::Full);
    assert!(buffer.remove("Doubt"));
    assert_eq!(buffer.add("Exam"), TagAddOutcome::Duplicate);

    let stored = editor.commit_tags("N1", &buffer).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_save_lock_blocks_pin_and_tags() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(60));
    editor.save_note(todo_draft()).await.unwrap();

    let err = editor.toggle_pin("N1").await.unwrap_err();
    assert!(err.is_locked());

    let mut buffer = editor.propose_tags("N1").await.unwrap();
    buffer.add("Exam");
    assert!(editor.commit_tags("N1", &buffer).await.unwrap_err().is_locked());

    // Checklist toggling is not held back by the lock
    assert!(editor.toggle_checklist_line("N1", 0).await.is_ok());
}

#[tokio::test]
async fn test_pin_ceiling_and_order() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(
        gateway.clone(),
        EditorConfig {
            save_lock_secs: 0,
            max_pinned: 1,
            ..EditorConfig::default()
        },
    );
    for title in ["first", "second"] {
        editor
            .save_note(NoteDraft::new(NoteType::Topic, title, RichText::default()))
            .await
            .unwrap();
    }

    assert_eq!(editor.toggle_pin("N1").await.unwrap(), PinState::Yes);
    let ids: Vec<_> = editor
        .notes_for_display()
        .await
        .into_iter()
        .map(|n| n.note_id)
        .collect();
    assert_eq!(ids, vec!["N1", "N2"]);

    assert!(editor.toggle_pin("N2").await.unwrap_err().is_validation());
    assert_eq!(editor.toggle_pin("N1").await.unwrap(), PinState::No);
    assert_eq!(editor.toggle_pin("N2").await.unwrap(), PinState::Yes);
}

#[tokio::test]
async fn test_failed_pin_reverts() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(0));
    editor
        .save_note(NoteDraft::new(NoteType::Topic, "p", RichText::default()))
        .await
        .unwrap();

    gateway.set_offline(true);
    assert!(editor.toggle_pin("N1").await.is_err());
    assert_eq!(editor.note("N1").await.unwrap().is_pinned, PinState::No);
}

#[tokio::test]
async fn test_update_content_persists_encoded() {
    let gateway = Arc::new(InMemoryGateway::new());
    let editor = editor_with(gateway.clone(), config(0));
    editor
        .save_note(NoteDraft::new(NoteType::Pointers, "p", RichText::paragraph("old")))
        .await
        .unwrap();

    let body = RichText::paragraph("x + y = 100% <tricky> & \"quoted\" ✓");
    let card = editor.update_content("N1", body.clone()).await.unwrap();
    assert_eq!(card.note_content, body);

    let stored = gateway.note("N1").await.unwrap();
    assert!(!stored.note_content.contains('+'));
    assert_eq!(ContentCodec::decode(&stored.note_content), body);
}

#[tokio::test]
async fn test_load_session_notes_decodes_and_keeps_provisional() {
    let gateway = Arc::new(InMemoryGateway::new());
    let current = session();
    gateway
        .seed_note(
            "STU-1",
            &current,
            RemoteNote {
                note_id: "N10".to_string(),
                session_id: String::new(),
                note_title: "Keywords: legacy".to_string(),
                note_content: "%3Cp%3Ebig+O%3C%2Fp%3E".to_string(),
                images: vec!["https://drive.google.com/file/d/abc123/view".to_string()],
                timestamp: chrono::Utc::now(),
                is_pinned: PinState::Yes,
                tags: vec!["Exam".to_string()],
            },
        )
        .await;

    let editor = editor_with(gateway.clone(), config(5));
    let provisional = editor.begin_save(todo_draft()).await.unwrap();

    assert_eq!(editor.load_session_notes().await.unwrap(), 1);

    let note = editor.note("N10").await.unwrap();
    assert_eq!(note.note_type, NoteType::Keywords);
    assert_eq!(note.session_id, "S2");
    assert_eq!(note.note_content.plain_text(), "big O");
    assert_eq!(
        note.images,
        vec!["https://drive.google.com/thumbnail?id=abc123&sz=w1000".to_string()]
    );
    assert!(editor.note(&provisional.note_id).await.is_some());
}

/// Gateway call that [`GatedGateway`] holds back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Content,
    Tags,
    Pin,
}

/// Gateway whose first gated call waits for a signal and then fails.
struct GatedGateway {
    inner: InMemoryGateway,
    gate: Gate,
    gated_calls: AtomicUsize,
    entered: Notify,
    release: Notify,
}

impl GatedGateway {
    fn new(gate: Gate) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryGateway::new(),
            gate,
            gated_calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        })
    }

    async fn hold(&self, call: Gate) -> Result<()> {
        if call == self.gate && self.gated_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.notify_one();
            self.release.notified().await;
            return Err(NoteError::persistence("slow request failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for GatedGateway {
    async fn save_note(&self, request: &SaveNoteRequest) -> Result<SavedNote> {
        self.inner.save_note(request).await
    }

    async fn list_notes(&self, student_id: &str, session_id: &str) -> Result<Vec<RemoteNote>> {
        self.inner.list_notes(student_id, session_id).await
    }

    async fn list_notes_by_subject(
        &self,
        student_id: &str,
        query: &SubjectQuery,
    ) -> Result<Vec<RemoteThreadSession>> {
        self.inner.list_notes_by_subject(student_id, query).await
    }

    async fn toggle_pin(&self, student_id: &str, note_id: &str) -> Result<PinState> {
        self.hold(Gate::Pin).await?;
        self.inner.toggle_pin(student_id, note_id).await
    }

    async fn update_tags(
        &self,
        student_id: &str,
        note_id: &str,
        tags: &[String],
    ) -> Result<Vec<String>> {
        self.hold(Gate::Tags).await?;
        self.inner.update_tags(student_id, note_id, tags).await
    }

    async fn update_content(
        &self,
        student_id: &str,
        note_id: &str,
        encoded_content: &str,
    ) -> Result<String> {
        self.hold(Gate::Content).await?;
        self.inner
            .update_content(student_id, note_id, encoded_content)
            .await
    }
}

#[tokio::test]
async fn test_late_failure_does_not_undo_newer_toggle() {
    let gateway = GatedGateway::new(Gate::Content);
    let editor = editor_with(gateway.clone(), config(0));
    editor.save_note(todo_draft()).await.unwrap();

    let slow = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.toggle_checklist_line("N1", 0).await })
    };
    gateway.entered.notified().await;

    let newer = editor.toggle_checklist_line("N1", 1).await.unwrap();
    assert_eq!(
        line_states(&newer.note_content),
        vec![LineState::Done, LineState::Done]
    );

    gateway.release.notify_one();
    assert!(slow.await.unwrap().is_err());

    let note = editor.note("N1").await.unwrap();
    assert_eq!(
        line_states(&note.note_content),
        vec![LineState::Done, LineState::Done],
        "the failed first toggle must not revert the second"
    );
}

#[tokio::test]
async fn test_late_failure_after_toggle_back_and_again() {
    let gateway = GatedGateway::new(Gate::Content);
    let editor = editor_with(gateway.clone(), config(0));
    editor.save_note(todo_draft()).await.unwrap();

    let slow = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.toggle_checklist_line("N1", 0).await })
    };
    gateway.entered.notified().await;

    // Back to pending, then done again: the body equals the slow toggle's
    editor.toggle_checklist_line("N1", 0).await.unwrap();
    let latest = editor.toggle_checklist_line("N1", 0).await.unwrap();
    assert_eq!(
        line_states(&latest.note_content),
        vec![LineState::Done, LineState::Pending]
    );

    gateway.release.notify_one();
    assert!(slow.await.unwrap().is_err());

    let local = editor.note("N1").await.unwrap().note_content;
    let stored = gateway.inner.note("N1").await.unwrap();
    assert_eq!(local, latest.note_content);
    assert_eq!(ContentCodec::decode(&stored.note_content), local);
}

#[tokio::test]
async fn test_late_tag_failure_after_same_tags_recommitted() {
    let gateway = GatedGateway::new(Gate::Tags);
    let editor = editor_with(gateway.clone(), config(0));
    editor
        .save_note(NoteDraft::new(NoteType::Topic, "tags", RichText::paragraph("t")))
        .await
        .unwrap();

    let mut exam = editor.propose_tags("N1").await.unwrap();
    exam.add("Exam");
    let mut doubt = editor.propose_tags("N1").await.unwrap();
    doubt.add("Doubt");

    let slow = {
        let editor = editor.clone();
        let exam = exam.clone();
        tokio::spawn(async move { editor.commit_tags("N1", &exam).await })
    };
    gateway.entered.notified().await;

    editor.commit_tags("N1", &doubt).await.unwrap();
    let latest = editor.commit_tags("N1", &exam).await.unwrap();
    assert_eq!(latest, vec!["Exam".to_string()]);

    gateway.release.notify_one();
    assert!(slow.await.unwrap().is_err());

    let local = editor.note("N1").await.unwrap().tags;
    assert_eq!(local, vec!["Exam".to_string()]);
    assert_eq!(gateway.inner.note("N1").await.unwrap().tags, local);
}

#[tokio::test]
async fn test_late_pin_failure_keeps_newer_pin_state() {
    let gateway = GatedGateway::new(Gate::Pin);
    let editor = editor_with(gateway.clone(), config(0));
    editor
        .save_note(NoteDraft::new(NoteType::Topic, "pin", RichText::paragraph("p")))
        .await
        .unwrap();

    let slow = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.toggle_pin("N1").await })
    };
    gateway.entered.notified().await;

    // The slow pin never reached the backend, so this flip pins it there
    assert_eq!(editor.toggle_pin("N1").await.unwrap(), PinState::Yes);

    gateway.release.notify_one();
    assert!(slow.await.unwrap().is_err());

    let local = editor.note("N1").await.unwrap().is_pinned;
    assert_eq!(local, PinState::Yes);
    assert_eq!(gateway.inner.note("N1").await.unwrap().is_pinned, local);
}
