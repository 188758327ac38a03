//! Page summarization through an OpenAI-compatible chat completions API.

use std::time::Instant;

use reqwest::Client;
use tracing::{debug, info, warn};

use blinko_core::defaults::CHAT_COMPLETIONS_PATH;
use blinko_core::{
    build_chat_completion_url, normalize_auth_header, render_prompt, resolve_template, Error,
    Result, Settings,
};

use crate::config::{remote_error, request_error, ClientConfig};
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Client for the user's configured LLM endpoint.
#[derive(Debug, Clone)]
pub struct SummarizationClient {
    client: Client,
}

impl SummarizationClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_client(config.build_client()?))
    }

    /// Share an existing connection pool.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Summarize `content` with the active prompt template.
    pub async fn summarize(&self, content: &str, settings: &Settings) -> Result<String> {
        let template = settings
            .active_template()
            .or_else(|| settings.prompt_templates.first())
            .map(|t| t.content.as_str())
            .unwrap_or("");
        self.complete(&render_prompt(template, content), settings)
            .await
    }

    /// Summarize `content` with the template routed for `page_url`.
    pub async fn summarize_page(
        &self,
        content: &str,
        page_url: &str,
        settings: &Settings,
    ) -> Result<String> {
        let template = resolve_template(page_url, settings);
        self.complete(&render_prompt(template, content), settings)
            .await
    }

    /// Send one user message and return the trimmed reply.
    pub async fn complete(&self, prompt: &str, settings: &Settings) -> Result<String> {
        if settings.model_url.trim().is_empty() {
            return Err(Error::Config("LLM endpoint is not configured".to_string()));
        }
        let url = build_chat_completion_url(&settings.model_url, CHAT_COMPLETIONS_PATH)?;

        let request = ChatCompletionRequest {
            model: settings.model_name.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: settings.temperature,
        };

        debug!(
            subsystem = "llm",
            component = "summarize",
            op = "complete",
            model = %request.model,
            prompt_len = prompt.len(),
            "Requesting completion"
        );
        let start = Instant::now();

        let mut req = self.client.post(&url).json(&request);
        let auth = normalize_auth_header(&settings.api_key);
        if !auth.is_empty() {
            req = req.header("Authorization", auth);
        }

        let response = req.send().await.map_err(request_error)?;

        if !response.status().is_success() {
            let err = remote_error(response).await;
            warn!(
                subsystem = "llm",
                component = "summarize",
                op = "complete",
                error = %err,
                "Completion request rejected"
            );
            return Err(err);
        }

        let body = response.text().await.map_err(request_error)?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::ResponseFormat(format!("Failed to parse completion: {}", e)))?;

        let summary = parsed
            .first_content()
            .map(str::trim)
            .ok_or_else(|| {
                Error::ResponseFormat("Completion has no message content".to_string())
            })?
            .to_string();

        info!(
            subsystem = "llm",
            component = "summarize",
            op = "complete",
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            summary_len = summary.len(),
            "Completion received"
        );
        Ok(summary)
    }
}
