//! Student identity resolution at editor launch.

use std::sync::Arc;
use studynote_core::error::{NoteError, Result};
use studynote_core::session::{StudentDirectory, StudentIdentity};

/// Resolves who the editor writes notes for.
///
/// Order of precedence:
/// 1. An identity supplied directly by the hosting page
/// 2. A directory profile found by the authenticated email
/// 3. An identity derived from the email alone
pub struct StudentResolver {
    directory: Option<Arc<dyn StudentDirectory>>,
}

impl StudentResolver {
    pub fn new(directory: Arc<dyn StudentDirectory>) -> Self {
        Self {
            directory: Some(directory),
        }
    }

    /// Resolver without a directory; only direct identities and emails work.
    pub fn without_directory() -> Self {
        Self { directory: None }
    }

    pub async fn resolve(
        &self,
        direct: Option<StudentIdentity>,
        email: Option<&str>,
    ) -> Result<StudentIdentity> {
        if let Some(identity) = direct {
            return Ok(identity);
        }

        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| NoteError::validation("No student identity or email supplied"))?;

        let Some(directory) = &self.directory else {
            return Ok(StudentIdentity::from_email(email));
        };

        match directory.find_by_email(email).await {
            Ok(Some(profile)) => {
                tracing::debug!(
                    "[StudentResolver] Resolved {} to student {}",
                    email,
                    profile.student_id
                );
                Ok(profile.into())
            }
            Ok(None) => {
                tracing::debug!("[StudentResolver] No profile for {}, using email", email);
                Ok(StudentIdentity::from_email(email))
            }
            Err(e) => {
                tracing::warn!(
                    "[StudentResolver] Profile lookup failed for {}: {}",
                    email,
                    e
                );
                Ok(StudentIdentity::from_email(email))
            }
        }
    }
}
