use crate::events::{EditorAction, EditorEvent};
use crate::store::NoteStore;
use crate::thread_aggregator::ThreadAggregator;
use std::sync::Arc;
use studynote_core::config::EditorConfig;
use studynote_core::content::ContentCodec;
use studynote_core::error::{NoteError, Result};
use studynote_core::gateway::{PersistenceGateway, SaveNoteRequest};
use studynote_core::image::ImageResolver;
use studynote_core::note::{NoteCard, NoteDraft};
use studynote_core::save_lock::{SaveLockCountdown, SaveLockStore};
use studynote_core::session::{SessionContext, StudentIdentity, ThreadSession};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 64;

/// The note editor use case for one live session.
///
/// `NoteEditor` is responsible for:
/// - Creating notes optimistically and reconciling them with the backend
/// - Optimistic checklist, content, pin and tag edits with rollback
/// - Loading the current session notes and the subject thread view
/// - Enforcing the save-lock window and the pin ceiling
///
/// Cloning is cheap; clones share the same store, locks and event channel.
#[derive(Clone)]
pub struct NoteEditor {
    pub(super) gateway: Arc<dyn PersistenceGateway>,
    pub(super) store: Arc<RwLock<NoteStore>>,
    pub(super) locks: SaveLockCountdown,
    aggregator: ThreadAggregator,
    resolver: ImageResolver,
    session: Arc<SessionContext>,
    pub(super) student: Arc<StudentIdentity>,
    pub(super) config: Arc<EditorConfig>,
    events: broadcast::Sender<EditorEvent>,
}

impl NoteEditor {
    /// Creates an editor for `session` writing notes for `student`.
    ///
    /// # Arguments
    ///
    /// * `gateway` - Remote persistence backend
    /// * `lock_store` - Storage for save-lock expiries
    /// * `session` - The live session the editor was opened for
    /// * `student` - The resolved student identity
    /// * `config` - Editor settings
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        lock_store: Arc<dyn SaveLockStore>,
        session: SessionContext,
        student: StudentIdentity,
        config: EditorConfig,
    ) -> Self {
        let resolver = ImageResolver::new(config.placeholder_image_url.clone());
        let aggregator = ThreadAggregator::new(gateway.clone(), resolver.clone());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            gateway,
            store: Arc::new(RwLock::new(NoteStore::new(config.temp_id_prefix.clone()))),
            locks: SaveLockCountdown::new(lock_store),
            aggregator,
            resolver,
            session: Arc::new(session),
            student: Arc::new(student),
            config: Arc::new(config),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn student(&self) -> &StudentIdentity {
        &self.student
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn image_resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    /// Current session notes, pinned first then newest first.
    pub async fn notes_for_display(&self) -> Vec<NoteCard> {
        self.store.read().await.list_for_display()
    }

    pub async fn thread_sessions(&self) -> Vec<ThreadSession> {
        self.store.read().await.threads().to_vec()
    }

    /// Looks a note up in the current session and the thread view.
    pub async fn note(&self, note_id: &str) -> Option<NoteCard> {
        self.store.read().await.get(note_id).cloned()
    }

    /// Seconds until pin and tag actions unlock for a note; 0 when unlocked.
    pub fn save_lock_remaining(&self, note_id: &str) -> u64 {
        self.locks.remaining(note_id)
    }

    pub(super) fn emit(&self, event: EditorEvent) {
        // No subscribers is fine; the UI may not be listening yet
        let _ = self.events.send(event);
    }

    pub(super) fn report_failure(&self, note_id: &str, action: EditorAction, error: &NoteError) {
        tracing::warn!(
            "[NoteEditor] {:?} failed for note {}: {}",
            action,
            note_id,
            error
        );
        self.emit(EditorEvent::ActionFailed {
            note_id: note_id.to_string(),
            action,
            message: error.to_string(),
        });
    }

    /// Fetches the confirmed notes of the current session into the store.
    ///
    /// Provisional notes still in flight are kept. Expired save locks are
    /// pruned on the way. Returns the number of notes loaded.
    pub async fn load_session_notes(&self) -> Result<usize> {
        let session_id = self.session.session_id.clone();
        tracing::debug!("[NoteEditor] Loading notes for session {}", session_id);

        let remote = match self
            .gateway
            .list_notes(&self.student.student_id, &session_id)
            .await
        {
            Ok(remote) => remote,
            Err(e) => {
                self.report_failure(&session_id, EditorAction::LoadNotes, &e);
                return Err(e);
            }
        };

        let cards: Vec<NoteCard> = remote
            .into_iter()
            .map(|note| {
                let mut card = note.into_note_card(&self.resolver);
                if card.session_id.is_empty() {
                    card.session_id = session_id.clone();
                }
                card
            })
            .collect();
        let count = cards.len();
        self.store.write().await.replace_session_notes(cards);

        if let Err(e) = self.locks.prune() {
            tracing::warn!("[NoteEditor] Failed to prune save locks: {}", e);
        }

        tracing::debug!("[NoteEditor] Loaded {} note(s)", count);
        Ok(count)
    }

    /// Saves a draft: optimistic insert, then the gateway write.
    ///
    /// # Errors
    ///
    /// - `NoteError::Validation` for an empty draft (nothing is inserted)
    /// - the gateway error when the save fails (the provisional note is
    ///   removed again)
    pub async fn save_note(&self, draft: NoteDraft) -> Result<NoteCard> {
        let provisional = self.begin_save(draft).await?;
        self.complete_save(provisional).await
    }

    /// Validates a draft and inserts it as a provisional note.
    ///
    /// Starts the save-lock window on the temporary id. No I/O happens
    /// besides the lock store.
    pub async fn begin_save(&self, draft: NoteDraft) -> Result<NoteCard> {
        draft.validate()?;

        let images = self.resolver.resolve_all(&draft.images);
        let draft = draft.with_images(images);
        let card = self
            .store
            .write()
            .await
            .create_provisional(&draft, &self.session.session_id);

        if let Err(e) = self.locks.start(&card.note_id, self.config.save_lock_secs) {
            tracing::warn!(
                "[NoteEditor] Failed to start save lock for {}: {}",
                card.note_id,
                e
            );
        }
        Ok(card)
    }

    /// Sends a provisional note to the backend and reconciles the result.
    pub async fn complete_save(&self, provisional: NoteCard) -> Result<NoteCard> {
        let temp_id = provisional.note_id.clone();
        let request = SaveNoteRequest {
            student_id: self.student.student_id.clone(),
            session_id: self.session.session_id.clone(),
            title: provisional.note_title.clone(),
            encoded_content: ContentCodec::encode(&provisional.note_content),
            images: provisional.images.clone(),
            session: (*self.session).clone(),
        };

        tracing::debug!("[NoteEditor] Saving note {}", temp_id);
        match self.gateway.save_note(&request).await {
            Ok(saved) => {
                let confirmed = self.store.write().await.confirm(&temp_id, &saved);
                match confirmed {
                    Ok(card) => {
                        if let Err(e) = self.locks.rehome(&temp_id, &card.note_id) {
                            tracing::warn!(
                                "[NoteEditor] Failed to rehome save lock {}: {}",
                                temp_id,
                                e
                            );
                        }
                        tracing::info!("[NoteEditor] Saved note {} as {}", temp_id, card.note_id);
                        self.emit(EditorEvent::NoteSaved {
                            temp_id,
                            note_id: card.note_id.clone(),
                        });
                        Ok(card)
                    }
                    Err(e) => {
                        tracing::debug!(
                            "[NoteEditor] Provisional note {} vanished before confirm",
                            temp_id
                        );
                        self.release_lock(&temp_id);
                        Err(e)
                    }
                }
            }
            Err(e) => {
                tracing::warn!("[NoteEditor] Save failed for {}: {}", temp_id, e);
                if let Err(not_found) = self.store.write().await.rollback(&temp_id) {
                    tracing::debug!("[NoteEditor] Nothing to roll back: {}", not_found);
                }
                self.release_lock(&temp_id);
                self.emit(EditorEvent::SaveFailed {
                    temp_id,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Inserts the provisional note and saves it in the background.
    ///
    /// Returns the provisional card right away together with the handle of
    /// the save task.
    pub async fn spawn_save(
        &self,
        draft: NoteDraft,
    ) -> Result<(NoteCard, JoinHandle<Result<NoteCard>>)> {
        let provisional = self.begin_save(draft).await?;
        let editor = self.clone();
        let card = provisional.clone();
        let handle = tokio::spawn(async move { editor.complete_save(card).await });
        Ok((provisional, handle))
    }

    /// Replaces the thread view with the student's other sessions of this
    /// subject. Failures are logged and leave an empty thread view.
    pub async fn load_thread(&self) -> usize {
        let sessions = self
            .aggregator
            .load_or_empty(
                &self.student.student_id,
                &self.session.session_id,
                &self.session.subject_query(),
            )
            .await;
        let count = sessions.len();
        self.store.write().await.set_threads(sessions);
        self.emit(EditorEvent::ThreadLoaded { sessions: count });
        count
    }

    pub fn spawn_thread_load(&self) -> JoinHandle<usize> {
        let editor = self.clone();
        tokio::spawn(async move { editor.load_thread().await })
    }

    fn release_lock(&self, note_id: &str) {
        if let Err(e) = self.locks.release(note_id) {
            tracing::warn!("[NoteEditor] Failed to release save lock {}: {}", note_id, e);
        }
    }
}
