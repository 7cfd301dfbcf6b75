//! Tag editing buffer.
//!
//! A persisted tag set always holds between one and [`MAX_TAGS`] entries.
//! The buffer may be empty while the student is still editing; the check
//! happens on commit.

use crate::error::{NoteError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on tags per note.
pub const MAX_TAGS: usize = 3;

/// Vocabulary offered as quick picks. Free-text tags are also accepted.
pub const PREDEFINED_TAGS: &[&str] = &[
    "Important",
    "Exam",
    "Revision",
    "Doubt",
    "Assignment",
    "Formula",
    "Definition",
    "Example",
];

/// Result of [`TagBuffer::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAddOutcome {
    Added,
    /// Buffer already holds the maximum number of tags
    Full,
    /// Exact (case-sensitive) match already present
    Duplicate,
    /// Tag was empty after trimming
    Blank,
}

/// Edit buffer seeded from a note's current tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBuffer {
    tags: Vec<String>,
}

impl TagBuffer {
    /// Opens a buffer with the note's existing tags.
    pub fn propose(existing: &[String]) -> Self {
        Self {
            tags: existing.to_vec(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tags.len() >= MAX_TAGS
    }

    /// Appends a tag unless the buffer is full or already contains it.
    pub fn add(&mut self, tag: &str) -> TagAddOutcome {
        let tag = tag.trim();
        if tag.is_empty() {
            return TagAddOutcome::Blank;
        }
        if self.is_full() {
            return TagAddOutcome::Full;
        }
        if self.tags.iter().any(|t| t == tag) {
            return TagAddOutcome::Duplicate;
        }
        self.tags.push(tag.to_string());
        TagAddOutcome::Added
    }

    /// Removes one matching entry, trimmed like `add`. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        match self.tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.tags.remove(index);
                true
            }
            None => false,
        }
    }

    /// Vocabulary entries not yet in the buffer.
    pub fn suggestions(&self) -> Vec<&'static str> {
        PREDEFINED_TAGS
            .iter()
            .copied()
            .filter(|candidate| !self.tags.iter().any(|t| t == candidate))
            .collect()
    }

    /// Returns the tag set to persist, enforcing `1..=MAX_TAGS`.
    pub fn validated(&self) -> Result<Vec<String>> {
        if self.tags.is_empty() {
            return Err(NoteError::validation("A note needs at least one tag"));
        }
        if self.tags.len() > MAX_TAGS {
            return Err(NoteError::validation(format!(
                "A note can have at most {} tags",
                MAX_TAGS
            )));
        }
        Ok(self.tags.clone())
    }
}
