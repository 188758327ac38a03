//! Final note body composition: source link and tag.

use crate::defaults::SOURCE_LINK_LABEL;
use crate::models::{ContentType, Settings};

/// Markdown link to the source page; the title falls back to the URL.
fn source_link(url: &str, title: &str) -> String {
    let text = if title.trim().is_empty() { url } else { title };
    format!("[{}]({})", text, url)
}

/// Link line appended to text notes.
pub fn source_line(url: &str, title: &str) -> String {
    format!("{}: {}", SOURCE_LINK_LABEL, source_link(url, title))
}

/// Blockquote citation appended to image notes.
pub fn image_citation(url: &str, title: &str) -> String {
    format!("> {}: {}", SOURCE_LINK_LABEL, source_link(url, title))
}

fn wants_source_link(
    content: &str,
    url: &str,
    title: &str,
    content_type: ContentType,
    settings: &Settings,
) -> bool {
    if url.trim().is_empty() || !settings.includes_url_for(content_type) {
        return false;
    }
    // quick notes are re-saved as the user edits; keep a single link
    !(content_type == ContentType::QuickNote && content.contains(&source_line(url, title)))
}

/// Build the note body sent to Blinko for `content` of `content_type`.
pub fn compose_note_content(
    content: &str,
    url: &str,
    title: &str,
    content_type: ContentType,
    settings: &Settings,
) -> String {
    let mut body = content.to_string();

    if wants_source_link(content, url, title, content_type, settings) {
        if content_type == ContentType::Image {
            if !body.is_empty() {
                body.push_str("\n\n");
            }
            body.push_str(&image_citation(url, title));
        } else {
            body.push_str("\n\n");
            body.push_str(&source_line(url, title));
        }
    }

    let tag = settings.tag_for(content_type);
    if !tag.is_empty() {
        if !body.is_empty() {
            body.push_str("\n\n");
        }
        body.push_str(tag);
    }

    body
}
