//! Blinko note submission, attachment upload and server AI config lookup.

use std::path::Path;
use std::time::Instant;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use blinko_core::defaults::{CONFIG_LIST_PATH, FILE_UPLOAD_PATH, NOTE_TYPE_FLASH, NOTE_UPSERT_PATH};
use blinko_core::{
    api_endpoint, compose_note_content, normalize_auth_header, Attachment, Attachments,
    BlinkoAiConfig, ContentType, Error, Result, Settings, SubmitResult,
};

use crate::config::{remote_error, request_error, ClientConfig};
use crate::types::{NoteUpsertRequest, UploadResponse};

const FALLBACK_MIME: &str = "application/octet-stream";

/// A file to upload as a note attachment.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Detected from the file's magic bytes when `None`.
    pub mime_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk; the upload name is the path's file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Validation(format!("{} has no file name", path.display())))?;
        Ok(Self::new(file_name, bytes))
    }

    /// Caller-supplied type, else sniffed from content, else octet-stream.
    pub fn resolved_mime_type(&self) -> String {
        if let Some(mime) = self.mime_type.as_deref().filter(|m| !m.trim().is_empty()) {
            return mime.to_string();
        }
        infer::get(&self.bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| FALLBACK_MIME.to_string())
    }
}

/// Client for the Blinko REST API.
#[derive(Debug, Clone)]
pub struct NoteClient {
    client: Client,
}

impl NoteClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_client(config.build_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn authorized(&self, req: RequestBuilder, settings: &Settings) -> RequestBuilder {
        req.header("Authorization", normalize_auth_header(&settings.auth_key))
    }

    fn require_credentials(settings: &Settings) -> Result<()> {
        if settings.has_blinko_credentials() {
            Ok(())
        } else {
            Err(Error::Config(
                "Blinko URL and auth key must be configured".to_string(),
            ))
        }
    }

    /// Compose and post a note. Failures come back as an unsuccessful
    /// [`SubmitResult`], never as an error.
    pub async fn submit(
        &self,
        content: &str,
        url: &str,
        title: &str,
        attachments: impl Into<Attachments>,
        content_type: ContentType,
        settings: &Settings,
    ) -> SubmitResult {
        let attachments = attachments.into();
        match self
            .try_submit(content, url, title, attachments, content_type, settings)
            .await
        {
            Ok(data) => SubmitResult::ok(data),
            Err(e) => {
                warn!(
                    subsystem = "blinko",
                    component = "notes",
                    op = "submit",
                    content_type = %content_type,
                    status = ?e.status(),
                    error = %e,
                    "Note submission failed"
                );
                SubmitResult::failed(e.to_string())
            }
        }
    }

    async fn try_submit(
        &self,
        content: &str,
        url: &str,
        title: &str,
        attachments: Attachments,
        content_type: ContentType,
        settings: &Settings,
    ) -> Result<JsonValue> {
        Self::require_credentials(settings)?;

        let request = NoteUpsertRequest {
            content: compose_note_content(content, url, title, content_type, settings),
            note_type: NOTE_TYPE_FLASH,
            attachments: attachments.into_vec(),
        };
        let endpoint = api_endpoint(&settings.target_url, NOTE_UPSERT_PATH);

        debug!(
            subsystem = "blinko",
            component = "notes",
            op = "submit",
            content_type = %content_type,
            content_len = request.content.len(),
            attachment_count = request.attachments.len(),
            "Posting note"
        );
        let start = Instant::now();

        let response = self
            .authorized(self.client.post(&endpoint), settings)
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let body = response.text().await.map_err(request_error)?;
        let data: JsonValue = serde_json::from_str(&body)
            .map_err(|e| Error::ResponseFormat(format!("Note response is not JSON: {}", e)))?;

        info!(
            subsystem = "blinko",
            component = "notes",
            op = "submit",
            content_type = %content_type,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note saved"
        );
        Ok(data)
    }

    /// Upload `file` and return the attachment descriptor Blinko assigned.
    pub async fn upload_attachment(&self, file: FileUpload, settings: &Settings) -> Result<Attachment> {
        Self::require_credentials(settings)?;

        let mime_type = file.resolved_mime_type();
        let size = file.bytes.len() as u64;
        let file_name = file.file_name.clone();
        let part = Part::bytes(file.bytes)
            .file_name(file_name.clone())
            .mime_str(&mime_type)
            .map_err(|e| Error::Validation(format!("Invalid MIME type {}: {}", mime_type, e)))?;
        let form = Form::new().part("file", part);

        let endpoint = api_endpoint(&settings.target_url, FILE_UPLOAD_PATH);
        debug!(
            subsystem = "blinko",
            component = "notes",
            op = "upload",
            file_name = %file_name,
            mime_type = %mime_type,
            size,
            "Uploading attachment"
        );

        let response = self
            .authorized(self.client.post(&endpoint), settings)
            .multipart(form)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let body = response.text().await.map_err(request_error)?;
        let uploaded: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| Error::ResponseFormat(format!("Upload response is not JSON: {}", e)))?;

        if let Some(status) = uploaded.status.filter(|s| *s != 200) {
            return Err(Error::ResponseFormat(format!(
                "Upload reported status {}",
                status
            )));
        }
        let path = uploaded
            .file_path
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::ResponseFormat("Upload response has no filePath".to_string()))?;

        let attachment = Attachment {
            name: uploaded.file_name.clone().unwrap_or(file_name),
            path,
            size: uploaded.size_bytes().unwrap_or(size),
            mime_type: uploaded.mime_type.clone().unwrap_or(mime_type),
        };
        info!(
            subsystem = "blinko",
            component = "notes",
            op = "upload",
            path = %attachment.path,
            size = attachment.size,
            "Attachment uploaded"
        );
        Ok(attachment)
    }

    /// Read the server's AI provider settings from `/config/list`.
    pub async fn fetch_ai_config(&self, settings: &Settings) -> Result<BlinkoAiConfig> {
        Self::require_credentials(settings)?;

        let endpoint = api_endpoint(&settings.target_url, CONFIG_LIST_PATH);
        let response = self
            .authorized(self.client.get(&endpoint), settings)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let body = response.text().await.map_err(request_error)?;
        let config: BlinkoAiConfig = serde_json::from_str(&body)
            .map_err(|e| Error::ResponseFormat(format!("Invalid config response: {}", e)))?;

        debug!(
            subsystem = "blinko",
            component = "notes",
            op = "fetch_ai_config",
            provider = %config.ai_model_provider,
            "Fetched server AI config"
        );
        Ok(config)
    }
}
