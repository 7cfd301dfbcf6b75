//! Session context and thread-view models.

use crate::note::{NoteCard, sort_for_display};
use serde::{Deserialize, Serialize};

/// The live session the editor was opened for.
///
/// Supplied by the hosting page at launch and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub session_id: String,
    pub session_name: String,
    pub batch: String,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
}

impl SessionContext {
    pub fn new(
        session_id: impl Into<String>,
        session_name: impl Into<String>,
        batch: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            session_name: session_name.into(),
            batch: batch.into(),
            term: None,
            domain: None,
            subject: None,
            date: None,
            start_time: None,
        }
    }

    pub fn with_subject(
        mut self,
        term: impl Into<String>,
        domain: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        self.term = Some(term.into());
        self.domain = Some(domain.into());
        self.subject = Some(subject.into());
        self
    }

    pub fn with_schedule(mut self, date: impl Into<String>, start_time: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self.start_time = Some(start_time.into());
        self
    }

    /// The (batch, term, domain, subject) tuple shared by thread sessions.
    pub fn subject_query(&self) -> SubjectQuery {
        SubjectQuery {
            batch: self.batch.clone(),
            term: self.term.clone(),
            domain: self.domain.clone(),
            subject: self.subject.clone(),
        }
    }
}

/// Key of a subject thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectQuery {
    pub batch: String,
    pub term: Option<String>,
    pub domain: Option<String>,
    pub subject: Option<String>,
}

impl SubjectQuery {
    /// Whether a session context belongs to this subject thread.
    pub fn matches(&self, session: &SessionContext) -> bool {
        self.batch == session.batch
            && self.term == session.term
            && self.domain == session.domain
            && self.subject == session.subject
    }
}

/// Notes of one earlier session, shown read-only below the current notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSession {
    pub session_id: String,
    pub session_name: String,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub batch: String,
    pub term: Option<String>,
    pub domain: Option<String>,
    pub subject: Option<String>,
    pub notes: Vec<NoteCard>,
}

impl ThreadSession {
    pub fn find_note(&self, note_id: &str) -> Option<&NoteCard> {
        self.notes.iter().find(|n| n.note_id == note_id)
    }

    pub fn find_note_mut(&mut self, note_id: &str) -> Option<&mut NoteCard> {
        self.notes.iter_mut().find(|n| n.note_id == note_id)
    }

    /// Notes in display order (pinned first, newest first).
    pub fn sorted_notes(&self) -> Vec<NoteCard> {
        let mut notes = self.notes.clone();
        sort_for_display(&mut notes);
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_query_matches_same_tuple_only() {
        let current = SessionContext::new("S1", "Lecture 1", "B24").with_subject("T1", "CS", "Algo");
        let query = current.subject_query();

        let sibling = SessionContext::new("S2", "Lecture 2", "B24").with_subject("T1", "CS", "Algo");
        let other_subject =
            SessionContext::new("S3", "Lecture 1", "B24").with_subject("T1", "CS", "Networks");

        assert!(query.matches(&sibling));
        assert!(!query.matches(&other_subject));
    }

    #[test]
    fn test_session_context_wire_format() {
        let json = r#"{"sessionId":"S1","sessionName":"Intro","batch":"B24","subject":"Algo"}"#;
        let session: SessionContext = serde_json::from_str(json).unwrap();
        assert_eq!(session.subject.as_deref(), Some("Algo"));
        assert!(session.term.is_none());
    }
}
