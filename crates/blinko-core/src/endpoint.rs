//! Canonical forms of configured endpoints and credentials.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::{API_PREFIX, CHAT_COMPLETIONS_PATH};
use crate::error::{Error, Result};

static BEARER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^bearer(?:\s+|$)").expect("bearer prefix pattern is valid")
});

/// Produce an `Authorization` header value with exactly one `Bearer ` prefix.
///
/// Empty input yields `""`. So does input that is nothing but `Bearer`
/// prefixes, since no credential remains once they are stripped.
pub fn normalize_auth_header(token: &str) -> String {
    let mut rest = token.trim();
    while let Some(m) = BEARER_PREFIX.find(rest) {
        rest = rest[m.end()..].trim_start();
    }
    if rest.is_empty() {
        return String::new();
    }
    format!("Bearer {}", rest)
}

/// Canonical Blinko API base: no trailing slash, ends with `/api/v1`.
///
/// Anything after the first `/api/v1` is dropped. Empty input yields `""`.
pub fn normalize_api_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if url.trim().is_empty() {
        return String::new();
    }
    match find_segment(trimmed, API_PREFIX) {
        Some(idx) => format!("{}{}", &trimmed[..idx], API_PREFIX),
        None => format!("{}{}", trimmed, API_PREFIX),
    }
}

/// Bare service URL for display: `/api/v1...` and trailing slashes removed.
pub fn clean_domain_url(url: &str) -> String {
    let trimmed = url.trim();
    let base = match find_segment(trimmed, API_PREFIX) {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };
    base.trim_end_matches('/').to_string()
}

/// Full Blinko endpoint URL, e.g. `api_endpoint(target, "/note/upsert")`.
pub fn api_endpoint(target_url: &str, path: &str) -> String {
    format!("{}{}", normalize_api_base_url(target_url), path)
}

/// Byte offset of the first `segment` that ends at a path boundary, so
/// `/api/v1` matches in `/api/v1/x` but not in `/api/v10`.
fn find_segment(haystack: &str, segment: &str) -> Option<usize> {
    haystack.match_indices(segment).map(|(idx, _)| idx).find(|&idx| {
        let rest = &haystack[idx + segment.len()..];
        rest.is_empty() || rest.starts_with('/')
    })
}

/// Resolve an OpenAI-compatible endpoint from a user-supplied model URL.
///
/// A URL whose path already names `/v1/chat/completions` is kept as is;
/// otherwise the path is cut after its first `/v1` segment and `endpoint`
/// appended, or `/v1` + `endpoint` is appended when there is no such segment.
/// Only the path is searched, never the host.
pub fn build_chat_completion_url(base_url: &str, endpoint: &str) -> Result<String> {
    let base_url = base_url.trim();
    let mut parsed = url::Url::parse(base_url)
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;

    let full_path = format!("/v1{}", CHAT_COMPLETIONS_PATH);
    if find_segment(parsed.path(), &full_path).is_some() {
        return Ok(base_url.to_string());
    }
    if let Some(idx) = find_segment(parsed.path(), "/v1") {
        let path = format!("{}/v1{}", &parsed.path()[..idx], endpoint);
        parsed.set_path(&path);
        parsed.set_query(None);
        parsed.set_fragment(None);
        return Ok(parsed.to_string());
    }
    Ok(format!("{}/v1{}", base_url.trim_end_matches('/'), endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_header_adds_prefix() {
        assert_eq!(normalize_auth_header("abc123"), "Bearer abc123");
        assert_eq!(normalize_auth_header("  abc123  "), "Bearer abc123");
    }

    #[test]
    fn test_auth_header_keeps_single_prefix() {
        assert_eq!(normalize_auth_header("Bearer abc"), "Bearer abc");
        assert_eq!(normalize_auth_header("bearer   abc"), "Bearer abc");
        assert_eq!(normalize_auth_header("BEARER Bearer abc"), "Bearer abc");
    }

    #[test]
    fn test_auth_header_empty() {
        assert_eq!(normalize_auth_header(""), "");
        assert_eq!(normalize_auth_header("   "), "");
        assert_eq!(normalize_auth_header("Bearer "), "");
    }

    #[test]
    fn test_auth_header_bare_prefix_is_empty() {
        assert_eq!(normalize_auth_header("Bearer"), "");
        assert_eq!(normalize_auth_header("bearer bearer"), "");
    }

    #[test]
    fn test_auth_header_token_starting_with_bearer_word() {
        // "bearerish" is a token, not a prefix
        assert_eq!(normalize_auth_header("bearerish"), "Bearer bearerish");
    }

    #[test]
    fn test_auth_header_idempotent() {
        for token in ["x", "Bearer x", "bearer\tx", "Bearer Bearer y", "bearerish", "a b"] {
            let once = normalize_auth_header(token);
            assert_eq!(normalize_auth_header(&once), once, "token {:?}", token);
            assert!(once.starts_with("Bearer "));
            assert!(!once["Bearer ".len()..].to_lowercase().starts_with("bearer "));
        }
    }

    #[test]
    fn test_api_base_url_appends_prefix() {
        assert_eq!(
            normalize_api_base_url("https://blinko.example.com"),
            "https://blinko.example.com/api/v1"
        );
        assert_eq!(
            normalize_api_base_url("https://blinko.example.com///"),
            "https://blinko.example.com/api/v1"
        );
    }

    #[test]
    fn test_api_base_url_truncates_after_prefix() {
        assert_eq!(
            normalize_api_base_url("https://blinko.example.com/api/v1/note/upsert"),
            "https://blinko.example.com/api/v1"
        );
        assert_eq!(
            normalize_api_base_url("https://blinko.example.com/api/v1/"),
            "https://blinko.example.com/api/v1"
        );
    }

    #[test]
    fn test_api_base_url_prefix_needs_segment_boundary() {
        assert_eq!(
            normalize_api_base_url("https://h.example.com/api/v10"),
            "https://h.example.com/api/v10/api/v1"
        );
        assert_eq!(
            normalize_api_base_url("https://h.example.com/api/v10/api/v1/note"),
            "https://h.example.com/api/v10/api/v1"
        );
        assert_eq!(
            clean_domain_url("https://h.example.com/api/v10"),
            "https://h.example.com/api/v10"
        );
    }

    #[test]
    fn test_api_base_url_empty() {
        assert_eq!(normalize_api_base_url(""), "");
        assert_eq!(normalize_api_base_url("  "), "");
    }

    #[test]
    fn test_api_base_url_idempotent() {
        for url in [
            "http://localhost:1111",
            "http://localhost:1111/",
            "http://localhost:1111/api/v1",
            "http://localhost:1111/sub/api/v1/x/",
        ] {
            let once = normalize_api_base_url(url);
            assert!(once.ends_with("/api/v1"));
            assert!(!once.ends_with('/'));
            assert_eq!(normalize_api_base_url(&once), once);
        }
    }

    #[test]
    fn test_clean_domain_url() {
        assert_eq!(
            clean_domain_url("https://blinko.example.com/api/v1/"),
            "https://blinko.example.com"
        );
        assert_eq!(
            clean_domain_url("https://blinko.example.com//"),
            "https://blinko.example.com"
        );
        assert_eq!(clean_domain_url(""), "");
    }

    #[test]
    fn test_api_endpoint() {
        assert_eq!(
            api_endpoint("https://b.example.com/", "/note/upsert"),
            "https://b.example.com/api/v1/note/upsert"
        );
    }

    #[test]
    fn test_chat_url_full_path_unchanged() {
        let url = "https://api.example.com/v1/chat/completions";
        assert_eq!(
            build_chat_completion_url(url, "/chat/completions").unwrap(),
            url
        );
    }

    #[test]
    fn test_chat_url_truncates_at_v1() {
        assert_eq!(
            build_chat_completion_url("https://api.example.com/v1/models", "/chat/completions")
                .unwrap(),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(
            build_chat_completion_url("https://openrouter.ai/api/v1", "/chat/completions")
                .unwrap(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_url_appends_v1() {
        assert_eq!(
            build_chat_completion_url("http://localhost:11434/", "/chat/completions").unwrap(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_url_host_starting_with_v1() {
        assert_eq!(
            build_chat_completion_url("https://v1.example.com", "/chat/completions").unwrap(),
            "https://v1.example.com/v1/chat/completions"
        );
        assert_eq!(
            build_chat_completion_url("https://v1.example.com/proxy/v1/", "/chat/completions")
                .unwrap(),
            "https://v1.example.com/proxy/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_url_v1_needs_segment_boundary() {
        assert_eq!(
            build_chat_completion_url("https://api.example.com/v10", "/chat/completions")
                .unwrap(),
            "https://api.example.com/v10/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_url_invalid() {
        let err = build_chat_completion_url("not a url", "/chat/completions").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
        assert!(build_chat_completion_url("", "/chat/completions").is_err());
    }
}
