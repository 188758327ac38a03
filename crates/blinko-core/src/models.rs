//! Data models for the clipper: the settings record, templates, domain
//! rules, attachments and submission results.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::defaults;
use crate::error::Error;

// =============================================================================
// PROMPT TEMPLATES & DOMAIN RULES
// =============================================================================

/// A named prompt containing a `{content}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
}

impl PromptTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Rule routing pages whose host contains `domain_pattern` to a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPromptMapping {
    pub id: String,
    pub domain_pattern: String,
    pub template_id: String,
}

/// Templates shipped with a fresh settings record.
pub fn default_prompt_templates() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate::new(
            defaults::DEFAULT_TEMPLATE_ID,
            "Detailed summary",
            defaults::DEFAULT_SUMMARY_PROMPT,
        ),
        PromptTemplate::new(
            "short-summary",
            "One-line summary",
            defaults::SHORT_SUMMARY_PROMPT,
        ),
    ]
}

// =============================================================================
// UI PREFERENCES
// =============================================================================

/// Size of the floating action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatingBallSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl fmt::Display for FloatingBallSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
        }
    }
}

/// Color theme of the extension views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

// =============================================================================
// SETTINGS RECORD
// =============================================================================

/// The single persisted configuration record.
///
/// Keys are camelCase so records written by the browser extension load
/// unchanged. Missing keys fall back to [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Blinko endpoint (any of `host`, `host/`, `host/api/v1/...`).
    pub target_url: String,
    /// Blinko access token, with or without a `Bearer` prefix.
    pub auth_key: String,

    pub model_url: String,
    pub api_key: String,
    pub model_name: String,
    /// Sampling temperature in [0, 1].
    pub temperature: f32,

    pub prompt_templates: Vec<PromptTemplate>,
    pub active_prompt_template_id: String,
    pub domain_prompt_mappings: Vec<DomainPromptMapping>,

    pub include_summary_url: bool,
    pub include_selection_url: bool,
    pub include_image_url: bool,
    pub include_quick_note_url: bool,

    pub summary_tag: String,
    pub selection_tag: String,
    pub image_tag: String,
    pub extract_tag: String,
    pub quick_note_tag: String,

    pub enable_floating_ball: bool,
    pub floating_ball_size: FloatingBallSize,
    pub theme: Theme,

    pub jina_api_key: String,
    pub use_jina_api_key: bool,
    pub save_web_images: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            auth_key: String::new(),
            model_url: String::new(),
            api_key: String::new(),
            model_name: defaults::MODEL_NAME.to_string(),
            temperature: defaults::TEMPERATURE,
            prompt_templates: default_prompt_templates(),
            active_prompt_template_id: defaults::DEFAULT_TEMPLATE_ID.to_string(),
            domain_prompt_mappings: Vec::new(),
            include_summary_url: true,
            include_selection_url: true,
            include_image_url: true,
            include_quick_note_url: false,
            summary_tag: defaults::SUMMARY_TAG.to_string(),
            selection_tag: defaults::SELECTION_TAG.to_string(),
            image_tag: defaults::IMAGE_TAG.to_string(),
            extract_tag: defaults::EXTRACT_TAG.to_string(),
            quick_note_tag: String::new(),
            enable_floating_ball: true,
            floating_ball_size: FloatingBallSize::default(),
            theme: Theme::default(),
            jina_api_key: String::new(),
            use_jina_api_key: false,
            save_web_images: false,
        }
    }
}

impl Settings {
    /// True when both the Blinko endpoint and credential are set.
    pub fn has_blinko_credentials(&self) -> bool {
        !self.target_url.trim().is_empty() && !self.auth_key.trim().is_empty()
    }

    /// Whether a source link is appended for notes of this type.
    pub fn includes_url_for(&self, content_type: ContentType) -> bool {
        match content_type {
            ContentType::Summary => self.include_summary_url,
            ContentType::Extract => self.include_selection_url,
            ContentType::Image => self.include_image_url,
            ContentType::QuickNote => self.include_quick_note_url,
        }
    }

    /// Tag appended to notes of this type (may be empty).
    pub fn tag_for(&self, content_type: ContentType) -> &str {
        match content_type {
            ContentType::Summary => &self.summary_tag,
            ContentType::Extract => &self.extract_tag,
            ContentType::Image => &self.image_tag,
            ContentType::QuickNote => &self.quick_note_tag,
        }
    }

    /// Look up a template by id.
    pub fn template(&self, id: &str) -> Option<&PromptTemplate> {
        self.prompt_templates.iter().find(|t| t.id == id)
    }

    /// The template referenced by `active_prompt_template_id`.
    pub fn active_template(&self) -> Option<&PromptTemplate> {
        self.template(&self.active_prompt_template_id)
    }
}

// =============================================================================
// NOTES
// =============================================================================

/// Kind of content being saved; selects the link flag and tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Summary,
    Extract,
    Image,
    QuickNote,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Extract => "extract",
            Self::Image => "image",
            Self::QuickNote => "quickNote",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(Self::Summary),
            "extract" => Ok(Self::Extract),
            "image" => Ok(Self::Image),
            "quickNote" | "quick-note" | "quick_note" => Ok(Self::QuickNote),
            other => Err(Error::Validation(format!("Unknown content type: {}", other))),
        }
    }
}

/// A file already uploaded to Blinko.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
}

/// Zero, one or many attachments referenced by a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments(Vec<Attachment>);

impl Attachments {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn into_vec(self) -> Vec<Attachment> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Attachment> for Attachments {
    fn from(a: Attachment) -> Self {
        Self(vec![a])
    }
}

impl From<Vec<Attachment>> for Attachments {
    fn from(v: Vec<Attachment>) -> Self {
        Self(v)
    }
}

impl From<Option<Attachment>> for Attachments {
    fn from(a: Option<Attachment>) -> Self {
        Self(a.into_iter().collect())
    }
}

/// Page data produced by the content extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub content: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// Outcome of a note submission, shaped as `{success, data}` or `{success, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResult {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// AI provider settings exposed by Blinko's `/config/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlinkoAiConfig {
    #[serde(default)]
    pub ai_model_provider: String,
    #[serde(default)]
    pub ai_api_endpoint: Option<String>,
    #[serde(default)]
    pub ai_api_key: Option<String>,
    #[serde(default)]
    pub ai_model: Option<String>,
}
