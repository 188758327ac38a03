//! Centralized default constants for the clipper.
//!
//! The default settings record, the HTTP clients and the CLI all read from
//! here instead of repeating literals.

// =============================================================================
// STORAGE
// =============================================================================

/// Key under which the settings record is persisted.
pub const SETTINGS_KEY: &str = "settings";

/// Trailing-edge delay for coalescing settings writes, in milliseconds.
pub const SAVE_DEBOUNCE_MS: u64 = 750;

// =============================================================================
// BLINKO API
// =============================================================================

/// Path segment every Blinko API base URL ends with.
pub const API_PREFIX: &str = "/api/v1";

/// Note create/update endpoint.
pub const NOTE_UPSERT_PATH: &str = "/note/upsert";

/// Attachment upload endpoint.
pub const FILE_UPLOAD_PATH: &str = "/file/upload";

/// Server configuration endpoint (exposes the AI provider settings).
pub const CONFIG_LIST_PATH: &str = "/config/list";

/// Note type sent with every upsert (0 = flash note).
pub const NOTE_TYPE_FLASH: u8 = 0;

/// AI provider name for which Blinko's config can be imported.
pub const SUPPORTED_AI_PROVIDER: &str = "OpenAI";

// =============================================================================
// LLM
// =============================================================================

/// Chat completions path appended after `/v1`.
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Default chat model.
pub const MODEL_NAME: &str = "gpt-4o-mini";

/// Default sampling temperature.
pub const TEMPERATURE: f32 = 0.5;

/// Placeholder replaced by page content when rendering a prompt.
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Default HTTP timeout for remote calls, in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// PROMPT TEMPLATES
// =============================================================================

/// Id of the template active in a fresh settings record.
pub const DEFAULT_TEMPLATE_ID: &str = "default-summary";

/// Id given to the template synthesized from a legacy single prompt string.
pub const MIGRATED_TEMPLATE_ID: &str = "migrated-prompt";

/// Name given to the template synthesized from a legacy single prompt string.
pub const MIGRATED_TEMPLATE_NAME: &str = "Migrated template";

/// Label shown for a domain rule whose template no longer exists.
pub const UNKNOWN_TEMPLATE_LABEL: &str = "Unknown template";

/// Detailed structured summary prompt.
pub const DEFAULT_SUMMARY_PROMPT: &str = "\
Write a well-structured summary of the web page below that highlights the key points without leaving out anything important.

Requirements:
1. Structure:
    * Start with a short title on the first line using the '# Title' format.
    * Give a one-sentence summary that captures the core of the whole page.
    * Then summarize each main section in the order it appears on the page.
2. Highlight what matters: call out key information, themes, arguments and conclusions, including important data.
3. Completeness: cover every important aspect of the page.

Notes:
* Stay objective and neutral.
* Keep the language plain and concise.
* Do not add a closing summary; the one-sentence summary serves that purpose.

Page content: {content}";

/// One-line summary prompt.
pub const SHORT_SUMMARY_PROMPT: &str = "Summarize the following web page in one sentence: {content}";

// =============================================================================
// NOTE COMPOSITION
// =============================================================================

/// Default tag for page summaries.
pub const SUMMARY_TAG: &str = "#web/summary";

/// Default tag for text selections.
pub const SELECTION_TAG: &str = "#web/excerpt";

/// Default tag for saved images.
pub const IMAGE_TAG: &str = "#web/image";

/// Default tag for full-page clips.
pub const EXTRACT_TAG: &str = "#web/clip";

/// Label of the source-link line appended to text notes.
pub const SOURCE_LINK_LABEL: &str = "Source";
