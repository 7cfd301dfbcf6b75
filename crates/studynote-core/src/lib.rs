//! Domain layer of the Studynote session note editor.
//!
//! Holds the note and session models, the rich-text content tree with its
//! codec and checklist toggler, image resolution, the save-lock countdown and
//! the traits implemented by the infrastructure layer.

pub mod config;
pub mod content;
pub mod error;
pub mod gateway;
pub mod image;
pub mod note;
pub mod save_lock;
pub mod session;

// Re-export common error type
pub use error::NoteError;
