//! Note domain module.
//!
//! - `model`: `NoteCard`, `NoteDraft`, `NoteType`, `PinState` and title helpers
//! - `tags`: the tag edit buffer and its 1..=3 invariant

mod model;
pub mod tags;

pub use model::{NoteCard, NoteDraft, NoteTitle, NoteType, PinState, sort_for_display};
pub use tags::{MAX_TAGS, PREDEFINED_TAGS, TagAddOutcome, TagBuffer};
