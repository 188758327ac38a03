//! # blinko-core
//!
//! Core types and logic for the Blinko web clipper.
//!
//! This crate provides:
//! - The persisted settings record and its load/merge/migrate/save cycle
//! - Prompt template management and per-domain template routing
//! - Canonical Blinko API and chat-completions URLs, bearer auth headers
//! - Note body composition (source links, tags)
//! - Settings change notifications and debounced persistence
//!
//! Log events carry `subsystem`, `component` and `op` fields; the HTTP
//! clients in `blinko-client` follow the same convention.

pub mod compose;
pub mod debounce;
pub mod defaults;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod models;
pub mod settings;
pub mod store;
pub mod template;

// Re-export commonly used types at crate root
pub use compose::compose_note_content;
pub use debounce::DebouncedSaver;
pub use endpoint::{
    api_endpoint, build_chat_completion_url, clean_domain_url, normalize_api_base_url,
    normalize_auth_header,
};
pub use error::{Error, Result};
pub use events::{EventBus, EventEnvelope, SettingsEvent};
pub use models::*;
pub use settings::{Loaded, SettingsManager};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
pub use template::{render_prompt, resolve_prompt_template, resolve_template};
