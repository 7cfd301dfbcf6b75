//! The note editor use case.

mod actions;
mod note_editor;

pub use note_editor::NoteEditor;
