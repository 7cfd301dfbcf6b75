//! In-memory student directory.

use async_trait::async_trait;
use std::collections::HashMap;
use studynote_core::error::Result;
use studynote_core::session::{StudentDirectory, StudentProfile};
use tokio::sync::RwLock;

/// Student profiles keyed by lower-cased email.
#[derive(Debug, Default)]
pub struct InMemoryStudentDirectory {
    profiles: RwLock<HashMap<String, StudentProfile>>,
}

impl InMemoryStudentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = StudentProfile>) -> Self {
        Self {
            profiles: RwLock::new(
                profiles
                    .into_iter()
                    .map(|p| (p.email.trim().to_lowercase(), p))
                    .collect(),
            ),
        }
    }

    pub async fn insert(&self, profile: StudentProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.email.trim().to_lowercase(), profile);
    }
}

#[async_trait]
impl StudentDirectory for InMemoryStudentDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<StudentProfile>> {
        let key = email.trim().to_lowercase();
        Ok(self.profiles.read().await.get(&key).cloned())
    }
}
