//! Thread view loading.

use std::cmp::Reverse;
use std::sync::Arc;
use studynote_core::error::Result;
use studynote_core::gateway::PersistenceGateway;
use studynote_core::image::ImageResolver;
use studynote_core::session::{SubjectQuery, ThreadSession};

/// Loads the student's notes from the other sessions of a subject.
///
/// Results are read-only session groups: the excluded (current) session is
/// dropped, sessions without notes are dropped, and groups are ordered by
/// date and start time, newest first.
#[derive(Clone)]
pub struct ThreadAggregator {
    gateway: Arc<dyn PersistenceGateway>,
    resolver: ImageResolver,
}

impl ThreadAggregator {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, resolver: ImageResolver) -> Self {
        Self { gateway, resolver }
    }

    pub async fn load(
        &self,
        student_id: &str,
        exclude_session_id: &str,
        query: &SubjectQuery,
    ) -> Result<Vec<ThreadSession>> {
        tracing::debug!(
            "[ThreadAggregator] Loading thread for batch={} subject={:?} (excluding {})",
            query.batch,
            query.subject,
            exclude_session_id
        );

        let remote = self.gateway.list_notes_by_subject(student_id, query).await?;

        let mut sessions: Vec<ThreadSession> = remote
            .into_iter()
            .filter(|s| s.session_id != exclude_session_id)
            .map(|s| s.into_thread_session(&self.resolver))
            .filter(|s| !s.notes.is_empty())
            .collect();

        sessions.sort_by(|a, b| {
            (Reverse(&a.date), Reverse(&a.start_time))
                .cmp(&(Reverse(&b.date), Reverse(&b.start_time)))
        });

        tracing::debug!(
            "[ThreadAggregator] Loaded {} session(s)",
            sessions.len()
        );
        Ok(sessions)
    }

    /// Like [`ThreadAggregator::load`], but logs failures and yields no
    /// sessions instead of an error.
    pub async fn load_or_empty(
        &self,
        student_id: &str,
        exclude_session_id: &str,
        query: &SubjectQuery,
    ) -> Vec<ThreadSession> {
        match self.load(student_id, exclude_session_id, query).await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("[ThreadAggregator] Thread load failed: {}", e);
                Vec::new()
            }
        }
    }
}
