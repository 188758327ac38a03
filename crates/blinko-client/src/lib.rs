//! # blinko-client
//!
//! HTTP clients for the Blinko web clipper.
//!
//! - [`SummarizationClient`]: OpenAI-compatible chat completions
//! - [`NoteClient`]: note upsert, attachment upload and `/config/list`
//! - [`Clipper`]: the summarize/upload-then-save flows behind each user action
//!
//! All clients take the current [`blinko_core::Settings`] per call, so edits
//! take effect without rebuilding a client.
//!
//! ## Example
//!
//! ```rust,ignore
//! use blinko_client::{ClientConfig, Clipper};
//! use blinko_core::{PageContent, Settings};
//!
//! let clipper = Clipper::new(&ClientConfig::from_env())?;
//! let page = PageContent {
//!     content: "Article body".into(),
//!     title: "Title".into(),
//!     url: "https://example.com/post".into(),
//! };
//! let result = clipper.save_summary(&page, &settings).await;
//! ```

pub mod clip;
pub mod config;
pub mod notes;
pub mod summarize;
pub mod types;

pub use clip::Clipper;
pub use config::ClientConfig;
pub use notes::{FileUpload, NoteClient};
pub use summarize::SummarizationClient;
