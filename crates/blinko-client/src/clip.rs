//! End-to-end clipping flows: summarize or upload, then save the note.

use tracing::warn;

use blinko_core::{Attachments, ContentType, PageContent, Result, Settings, SubmitResult};

use crate::config::ClientConfig;
use crate::notes::{FileUpload, NoteClient};
use crate::summarize::SummarizationClient;

/// Runs each user action against one shared connection pool.
#[derive(Debug, Clone)]
pub struct Clipper {
    notes: NoteClient,
    summarizer: SummarizationClient,
}

impl Clipper {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self {
            notes: NoteClient::with_client(client.clone()),
            summarizer: SummarizationClient::with_client(client),
        })
    }

    pub fn notes(&self) -> &NoteClient {
        &self.notes
    }

    pub fn summarizer(&self) -> &SummarizationClient {
        &self.summarizer
    }

    /// Summarize the page with its routed template and save the summary.
    pub async fn save_summary(&self, page: &PageContent, settings: &Settings) -> SubmitResult {
        let summary = match self
            .summarizer
            .summarize_page(&page.content, &page.url, settings)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    subsystem = "clip",
                    component = "clipper",
                    op = "save_summary",
                    error = %e,
                    "Summarization failed, nothing saved"
                );
                return SubmitResult::failed(e.to_string());
            }
        };

        self.notes
            .submit(
                &summary,
                &page.url,
                &page.title,
                Attachments::none(),
                ContentType::Summary,
                settings,
            )
            .await
    }

    /// Save extracted page text without summarizing it.
    pub async fn save_extract(&self, page: &PageContent, settings: &Settings) -> SubmitResult {
        self.notes
            .submit(
                &page.content,
                &page.url,
                &page.title,
                Attachments::none(),
                ContentType::Extract,
                settings,
            )
            .await
    }

    /// Save free text, optionally linked to the page it was written on.
    pub async fn save_quick_note(
        &self,
        text: &str,
        page: Option<&PageContent>,
        settings: &Settings,
    ) -> SubmitResult {
        let (url, title) = page
            .map(|p| (p.url.as_str(), p.title.as_str()))
            .unwrap_or(("", ""));
        self.notes
            .submit(
                text,
                url,
                title,
                Attachments::none(),
                ContentType::QuickNote,
                settings,
            )
            .await
    }

    /// Upload an image and save a note referencing it. `page.content` is
    /// used as the caption and may be empty.
    pub async fn save_image(
        &self,
        file: FileUpload,
        page: &PageContent,
        settings: &Settings,
    ) -> SubmitResult {
        let attachment = match self.notes.upload_attachment(file, settings).await {
            Ok(attachment) => attachment,
            Err(e) => {
                warn!(
                    subsystem = "clip",
                    component = "clipper",
                    op = "save_image",
                    error = %e,
                    "Upload failed, nothing saved"
                );
                return SubmitResult::failed(e.to_string());
            }
        };

        self.notes
            .submit(
                &page.content,
                &page.url,
                &page.title,
                attachment,
                ContentType::Image,
                settings,
            )
            .await
    }
}
