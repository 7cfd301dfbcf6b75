//! Temporary note identifiers.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Issues provisional note ids that are unique per editor instance.
///
/// Ids look like `temp_3_1f9c2a7b`: the configured prefix, a per-instance
/// counter and a short random suffix so ids from two editors never collide.
#[derive(Debug)]
pub struct TempIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl TempIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}{}_{}", self.prefix, n, &suffix[..8])
    }

    /// Whether an id was shaped by this generator's prefix.
    pub fn is_temp(&self, note_id: &str) -> bool {
        note_id.starts_with(&self.prefix)
    }
}

impl Default for TempIdGenerator {
    fn default() -> Self {
        Self::new("temp_")
    }
}
