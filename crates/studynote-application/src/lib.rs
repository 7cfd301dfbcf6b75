//! Application layer for Studynote.
//!
//! This crate provides the use cases of the session note editor. They
//! coordinate the in-memory note store, the persistence gateway and the
//! save-lock countdown defined by the domain layer.

pub mod editor;
pub mod events;
pub mod store;
pub mod student_resolver;
pub mod thread_aggregator;

pub use editor::NoteEditor;
pub use events::{EditorAction, EditorEvent};
pub use store::{NoteField, NoteLocation, NoteStore};
pub use student_resolver::StudentResolver;
pub use thread_aggregator::ThreadAggregator;
