//! Session domain module.
//!
//! - `model`: the active `SessionContext`, `SubjectQuery` and `ThreadSession`
//! - `student`: `StudentIdentity` and the `StudentDirectory` lookup trait

mod model;
mod student;

pub use model::{SessionContext, SubjectQuery, ThreadSession};
pub use student::{StudentDirectory, StudentIdentity, StudentProfile, display_name_from_email};
