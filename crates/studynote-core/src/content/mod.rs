//! Rich-text content module.
//!
//! # Module Structure
//!
//! - `tree`: the content tree (`RichText`, `Node`, `Element`, `StyleSet`)
//! - `html`: markup parsing and rendering for the tree
//! - `codec`: percent-encoded wire format, including the legacy `+` form
//! - `checklist`: line toggling for To-Do List notes

pub mod checklist;
mod codec;
mod html;
mod tree;

pub use checklist::{DONE_COLOR, LineState};
pub use codec::ContentCodec;
pub use html::{parse, render};
pub use tree::{Element, ElementKind, Node, RichText, StyleSet};
