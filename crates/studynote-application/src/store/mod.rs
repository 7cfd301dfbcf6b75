//! Note store and temporary id issuing.

mod note_store;
mod temp_id;

pub use note_store::{NoteField, NoteLocation, NoteStore};
pub use temp_id::TempIdGenerator;
