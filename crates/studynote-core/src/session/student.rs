//! Student identity and directory lookup.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The student the editor writes notes for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    pub student_id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl StudentIdentity {
    pub fn new(student_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            display_name: display_name.into(),
            email: None,
        }
    }

    /// Identity derived from an email alone, used when no profile exists.
    ///
    /// The email doubles as the student id and the display name is built from
    /// the local part (`jane.doe@x` becomes `Jane Doe`).
    pub fn from_email(email: &str) -> Self {
        Self {
            student_id: email.trim().to_string(),
            display_name: display_name_from_email(email),
            email: Some(email.trim().to_string()),
        }
    }
}

/// Profile record returned by the student directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub student_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub batch: Option<String>,
}

impl From<StudentProfile> for StudentIdentity {
    fn from(profile: StudentProfile) -> Self {
        Self {
            student_id: profile.student_id,
            display_name: profile.name,
            email: Some(profile.email),
        }
    }
}

/// Lookup of student profiles by authenticated email.
#[async_trait::async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Finds the profile for an email.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(profile))`: Profile found
    /// - `Ok(None)`: No student registered under this email
    /// - `Err(_)`: Lookup failed
    async fn find_by_email(&self, email: &str) -> Result<Option<StudentProfile>>;
}

/// Builds a display name from an email's local part.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.trim().split('@').next().unwrap_or_default();
    let words: Vec<String> = local
        .split(['.', '_', '-', '+'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        "Student".to_string()
    } else {
        words.join(" ")
    }
}
