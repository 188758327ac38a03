//! Prompt template selection by page domain.

use tracing::debug;

use crate::defaults::CONTENT_PLACEHOLDER;
use crate::models::{DomainPromptMapping, PromptTemplate, Settings};

/// Host part of a page URL, if it parses.
fn page_host(page_url: &str) -> Option<String> {
    url::Url::parse(page_url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Case-sensitive substring test of a rule's pattern against a host.
///
/// Blank patterns never match.
pub fn domain_matches(pattern: &str, host: &str) -> bool {
    let pattern = pattern.trim();
    !pattern.is_empty() && host.contains(pattern)
}

/// First domain rule matching `page_url` whose template still exists.
pub fn matching_rule<'a>(
    page_url: &str,
    settings: &'a Settings,
) -> Option<(&'a DomainPromptMapping, &'a PromptTemplate)> {
    let host = page_host(page_url)?;
    settings
        .domain_prompt_mappings
        .iter()
        .filter(|rule| domain_matches(&rule.domain_pattern, &host))
        .find_map(|rule| settings.template(&rule.template_id).map(|t| (rule, t)))
}

/// Template applying to `page_url`: a matching domain rule, else the active
/// template, else the first template.
pub fn resolve_prompt_template<'a>(
    page_url: &str,
    settings: &'a Settings,
) -> Option<&'a PromptTemplate> {
    if let Some((rule, template)) = matching_rule(page_url, settings) {
        debug!(
            subsystem = "settings",
            component = "template",
            op = "resolve",
            domain_pattern = %rule.domain_pattern,
            template_id = %template.id,
            "Domain rule matched"
        );
        return Some(template);
    }
    settings
        .active_template()
        .or_else(|| settings.prompt_templates.first())
}

/// Prompt text applying to `page_url`; `""` only when no templates exist.
pub fn resolve_template<'a>(page_url: &str, settings: &'a Settings) -> &'a str {
    resolve_prompt_template(page_url, settings)
        .map(|t| t.content.as_str())
        .unwrap_or("")
}

/// Substitute page content for the first `{content}` placeholder.
pub fn render_prompt(template: &str, content: &str) -> String {
    template.replacen(CONTENT_PLACEHOLDER, content, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_rules(rules: &[(&str, &str)]) -> Settings {
        let mut settings = Settings::default();
        settings
            .prompt_templates
            .push(PromptTemplate::new("X", "Code", "Explain this code: {content}"));
        settings.domain_prompt_mappings = rules
            .iter()
            .enumerate()
            .map(|(i, (pattern, template_id))| DomainPromptMapping {
                id: format!("rule-{}", i),
                domain_pattern: pattern.to_string(),
                template_id: template_id.to_string(),
            })
            .collect();
        settings
    }

    #[test]
    fn test_rule_overrides_active_template() {
        let settings = settings_with_rules(&[("example.com", "X")]);
        assert_eq!(
            resolve_template("https://example.com/a", &settings),
            "Explain this code: {content}"
        );
    }

    #[test]
    fn test_rule_matches_subdomain_by_substring() {
        let settings = settings_with_rules(&[("example.com", "X")]);
        assert_eq!(
            resolve_template("https://docs.example.com/page", &settings),
            "Explain this code: {content}"
        );
    }

    #[test]
    fn test_no_match_uses_active_template() {
        let mut settings = settings_with_rules(&[("github.com", "X")]);
        settings.active_prompt_template_id = "short-summary".to_string();
        assert_eq!(
            resolve_template("https://example.com/a", &settings),
            crate::defaults::SHORT_SUMMARY_PROMPT
        );
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let settings = settings_with_rules(&[("Example.com", "X")]);
        assert_eq!(
            resolve_template("https://example.com/", &settings),
            crate::defaults::DEFAULT_SUMMARY_PROMPT
        );
    }

    #[test]
    fn test_pattern_matches_host_not_path() {
        let settings = settings_with_rules(&[("example.com", "X")]);
        assert_eq!(
            resolve_template("https://other.org/example.com", &settings),
            crate::defaults::DEFAULT_SUMMARY_PROMPT
        );
    }

    #[test]
    fn test_dangling_rule_falls_through() {
        let settings = settings_with_rules(&[("example.com", "deleted"), ("example", "X")]);
        let (rule, template) = matching_rule("https://example.com", &settings).unwrap();
        assert_eq!(rule.id, "rule-1");
        assert_eq!(template.id, "X");

        let settings = settings_with_rules(&[("example.com", "deleted")]);
        assert_eq!(
            resolve_template("https://example.com", &settings),
            crate::defaults::DEFAULT_SUMMARY_PROMPT
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut settings = settings_with_rules(&[("example.com", "X"), ("example", "short-summary")]);
        assert_eq!(
            resolve_prompt_template("https://example.com", &settings).unwrap().id,
            "X"
        );
        settings.domain_prompt_mappings.reverse();
        assert_eq!(
            resolve_prompt_template("https://example.com", &settings).unwrap().id,
            "short-summary"
        );
    }

    #[test]
    fn test_blank_pattern_never_matches() {
        let settings = settings_with_rules(&[("  ", "X")]);
        assert!(matching_rule("https://example.com", &settings).is_none());
    }

    #[test]
    fn test_unparseable_url_uses_active_template() {
        let settings = settings_with_rules(&[("example.com", "X")]);
        assert_eq!(
            resolve_template("example.com", &settings),
            crate::defaults::DEFAULT_SUMMARY_PROMPT
        );
    }

    #[test]
    fn test_no_templates_resolves_empty() {
        let mut settings = Settings::default();
        settings.prompt_templates.clear();
        assert_eq!(resolve_template("https://example.com", &settings), "");
    }

    #[test]
    fn test_render_prompt_replaces_first_placeholder() {
        assert_eq!(render_prompt("Summarize: {content}", "hello"), "Summarize: hello");
        assert_eq!(render_prompt("{content} / {content}", "a"), "a / {content}");
        assert_eq!(render_prompt("no placeholder", "a"), "no placeholder");
    }
}
