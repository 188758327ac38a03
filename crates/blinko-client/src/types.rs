//! Request and response bodies for the chat-completions and Blinko APIs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use blinko_core::Attachment;

// =============================================================================
// CHAT COMPLETION TYPES
// =============================================================================

/// Request body for the chat completions endpoint.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from the chat completions endpoint.
///
/// Every field is optional so that a missing choice or message is reported
/// as a format error instead of a decode failure.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice's message, if present.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

// =============================================================================
// BLINKO TYPES
// =============================================================================

/// Body of `POST /note/upsert`.
#[derive(Debug, Serialize)]
pub struct NoteUpsertRequest {
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Body returned by `POST /file/upload`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Number or numeric string depending on the server version.
    #[serde(default)]
    pub size: Option<JsonValue>,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
}

impl UploadResponse {
    pub fn size_bytes(&self) -> Option<u64> {
        match self.size.as_ref()? {
            JsonValue::Number(n) => n.as_u64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error bodies seen from OpenAI-compatible servers (`{"error":{"message"}}`)
/// and from Blinko (`{"message"}`).
#[derive(Debug, Default, Deserialize)]
pub struct RemoteErrorBody {
    #[serde(default)]
    pub error: Option<RemoteErrorDetail>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

impl RemoteErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .or(self.message.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}
