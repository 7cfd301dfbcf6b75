//! HTTP transport for the persistence gateway.
//!
//! Every call is a `POST` of a JSON envelope `{"action": "...", ...params}`
//! to a single endpoint. The backend answers with
//! `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use studynote_core::config::EditorConfig;
use studynote_core::error::{NoteError, Result};
use studynote_core::gateway::{
    PersistenceGateway, RemoteNote, RemoteThreadSession, SaveNoteRequest, SavedNote,
};
use studynote_core::note::PinState;
use studynote_core::session::SubjectQuery;

#[derive(Debug, Serialize)]
struct ActionEnvelope<'a, P: Serialize> {
    action: &'a str,
    #[serde(flatten)]
    params: P,
}

#[derive(Debug, Deserialize)]
struct ActionResponse<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionNotesParams<'a> {
    student_id: &'a str,
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubjectParams<'a> {
    student_id: &'a str,
    #[serde(flatten)]
    query: &'a SubjectQuery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteParams<'a> {
    student_id: &'a str,
    note_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TagParams<'a> {
    student_id: &'a str,
    note_id: &'a str,
    tags: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentParams<'a> {
    student_id: &'a str,
    note_id: &'a str,
    note_content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PinData {
    is_pinned: PinState,
}

#[derive(Debug, Deserialize)]
struct TagData {
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ContentData {
    content: String,
}

/// Gateway talking to the note backend over HTTP.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            timeout,
        }
    }

    /// Builds a gateway from `gateway_endpoint` and `gateway_timeout_secs`.
    pub fn from_config(config: &EditorConfig) -> Result<Self> {
        let endpoint = config
            .gateway_endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| NoteError::config("gateway_endpoint is not set"))?;
        Ok(Self::new(
            endpoint,
            Duration::from_secs(config.gateway_timeout_secs),
        ))
    }

    /// Sends `Authorization: Bearer <key>` with every call.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<P, T>(&self, action: &str, params: P) -> Result<T>
    where
        P: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        tracing::debug!("[HttpGateway] {} -> {}", action, self.endpoint);

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&ActionEnvelope { action, params })
            .timeout(self.timeout);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(action, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NoteError::persistence(format!(
                "{} failed ({}): {}",
                action, status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(action, e))?;
        parse_response(action, &body)
    }
}

fn transport_error(action: &str, error: reqwest::Error) -> NoteError {
    if error.is_timeout() {
        NoteError::persistence(format!("{} timed out", action))
    } else {
        NoteError::persistence(format!("{} request failed: {}", action, error))
    }
}

fn parse_response<T: DeserializeOwned>(action: &str, body: &str) -> Result<T> {
    let response: ActionResponse<T> = serde_json::from_str(body).map_err(|e| {
        NoteError::persistence(format!("{} returned a malformed response: {}", action, e))
    })?;

    if !response.success {
        return Err(NoteError::persistence(format!(
            "{} rejected: {}",
            action,
            response.error.as_deref().unwrap_or("no reason given")
        )));
    }
    response
        .data
        .ok_or_else(|| NoteError::persistence(format!("{} returned no data", action)))
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn save_note(&self, request: &SaveNoteRequest) -> Result<SavedNote> {
        self.call("saveNote", request).await
    }

    async fn list_notes(&self, student_id: &str, session_id: &str) -> Result<Vec<RemoteNote>> {
        self.call(
            "listNotes",
            SessionNotesParams {
                student_id,
                session_id,
            },
        )
        .await
    }

    async fn list_notes_by_subject(
        &self,
        student_id: &str,
        query: &SubjectQuery,
    ) -> Result<Vec<RemoteThreadSession>> {
        self.call("listNotesBySubject", SubjectParams { student_id, query })
            .await
    }

    async fn toggle_pin(&self, student_id: &str, note_id: &str) -> Result<PinState> {
        let data: PinData = self
            .call("togglePin", NoteParams { student_id, note_id })
            .await?;
        Ok(data.is_pinned)
    }

    async fn update_tags(
        &self,
        student_id: &str,
        note_id: &str,
        tags: &[String],
    ) -> Result<Vec<String>> {
        let data: TagData = self
            .call(
                "updateTags",
                TagParams {
                    student_id,
                    note_id,
                    tags,
                },
            )
            .await?;
        Ok(data.tags)
    }

    async fn update_content(
        &self,
        student_id: &str,
        note_id: &str,
        encoded_content: &str,
    ) -> Result<String> {
        let data: ContentData = self
            .call(
                "updateContent",
                ContentParams {
                    student_id,
                    note_id,
                    note_content: encoded_content,
                },
            )
            .await?;
        Ok(data.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_flattens_params() {
        let query = SubjectQuery {
            batch: "B24".to_string(),
            term: Some("T1".to_string()),
            domain: None,
            subject: Some("Algo".to_string()),
        };
        let envelope = ActionEnvelope {
            action: "listNotesBySubject",
            params: SubjectParams {
                student_id: "STU-1",
                query: &query,
            },
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "action": "listNotesBySubject",
                "studentId": "STU-1",
                "batch": "B24",
                "term": "T1",
                "domain": null,
                "subject": "Algo"
            })
        );
    }

    #[test]
    fn test_parse_success_and_rejection() {
        let pin: PinData =
            parse_response("togglePin", r#"{"success":true,"data":{"isPinned":"Yes"}}"#).unwrap();
        assert_eq!(pin.is_pinned, PinState::Yes);

        let err = parse_response::<TagData>("updateTags", r#"{"success":false,"error":"denied"}"#)
            .unwrap_err();
        assert_eq!(err, NoteError::persistence("updateTags rejected: denied"));

        let err = parse_response::<TagData>("updateTags", "<html>").unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        assert!(matches!(
            HttpGateway::from_config(&EditorConfig::default()),
            Err(NoteError::Config(_))
        ));

        let config = EditorConfig {
            gateway_endpoint: Some("https://notes.example.edu/exec".to_string()),
            ..EditorConfig::default()
        };
        let gateway = HttpGateway::from_config(&config).unwrap();
        assert_eq!(gateway.endpoint(), "https://notes.example.edu/exec");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_persistence_error() {
        let gateway = HttpGateway::new("http://127.0.0.1:9/exec", Duration::from_secs(2));
        let err = gateway.list_notes("STU-1", "S1").await.unwrap_err();
        assert!(err.is_persistence());
    }
}
