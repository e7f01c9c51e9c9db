//! Sanitizing, validating, and transforming [`ToolContext`] snapshots.

use crate::types::{Page, RawContext, Theme, ToolContext};

/// Longest section identifier we keep after sanitizing.
pub const MAX_SECTION_LEN: usize = 50;

/// Normalizes untrusted context input into the closed types.
pub struct ContextSanitizer;

impl ContextSanitizer {
    /// Map any string onto the closed page set. Unknown values become `Home`.
    pub fn sanitize_page(page: &str) -> Page {
        Page::from_name(page.trim().to_ascii_lowercase().as_str()).unwrap_or(Page::Home)
    }

    /// Lowercase, collapse whitespace to `-`, drop anything outside `[a-z0-9_-]`.
    pub fn sanitize_section(section: &str) -> Option<String> {
        let cleaned: String = section
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .take(MAX_SECTION_LEN)
            .collect();
        if cleaned.is_empty() { None } else { Some(cleaned) }
    }

    pub fn sanitize_theme(theme: &str) -> Theme {
        Theme::from_name(theme.trim().to_ascii_lowercase().as_str()).unwrap_or(Theme::Light)
    }

    /// Build a well-formed context from raw producer input.
    pub fn sanitize(raw: &RawContext) -> ToolContext {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        ToolContext {
            current_page: raw
                .page
                .as_deref()
                .map(Self::sanitize_page)
                .unwrap_or(Page::Home),
            current_section: raw.section.as_deref().and_then(Self::sanitize_section),
            theme: raw
                .theme
                .as_deref()
                .map(Self::sanitize_theme)
                .unwrap_or_default(),
            session_id: non_empty(&raw.session_id).unwrap_or_else(|| "anonymous".into()),
            user_agent: non_empty(&raw.user_agent).unwrap_or_else(|| "unknown".into()),
        }
    }
}

/// Structural checks on an already-typed context.
pub struct ContextValidator;

impl ContextValidator {
    /// What a tool call needs: page and theme are typed, so only the
    /// session id can be wrong. Sections are free-form here.
    pub fn validate_envelope(context: &ToolContext) -> Vec<String> {
        let mut errors = Vec::new();
        if context.session_id.trim().is_empty() {
            errors.push("session_id must be a non-empty string".to_string());
        }
        errors
    }

    /// Envelope checks plus section form. Returns the list of problems;
    /// empty means valid.
    pub fn validate(context: &ToolContext) -> Vec<String> {
        let mut errors = Self::validate_envelope(context);
        if let Some(section) = &context.current_section {
            if ContextSanitizer::sanitize_section(section).as_deref() != Some(section.as_str()) {
                errors.push(format!("section '{section}' is not a valid identifier"));
            }
        }
        errors
    }

    pub fn is_valid(context: &ToolContext) -> bool {
        Self::validate(context).is_empty()
    }
}

/// Fields to replace when deriving a new context.
#[derive(Debug, Clone, Default)]
pub struct ContextUpdate {
    pub page: Option<Page>,
    pub section: Option<String>,
    pub theme: Option<Theme>,
}

/// Converts contexts to and from URL paths, and derives updated copies.
pub struct ContextTransformer;

impl ContextTransformer {
    /// `/` for home, `/<page>` otherwise, with `#<section>` when one is set.
    pub fn to_url_path(context: &ToolContext) -> String {
        let mut path = match context.current_page {
            Page::Home => "/".to_string(),
            page => format!("/{}", page.as_str()),
        };
        if let Some(section) = &context.current_section {
            path.push('#');
            path.push_str(section);
        }
        path
    }

    /// Parse `/<page>[/<section>][#<section>]` into a new context derived from `base`.
    pub fn from_url_path(path: &str, base: &ToolContext) -> ToolContext {
        let (path_part, fragment) = match path.split_once('#') {
            Some((p, f)) => (p, Some(f)),
            None => (path, None),
        };
        let path_part = path_part.split('?').next().unwrap_or_default();
        let mut segments = path_part.split('/').filter(|s| !s.is_empty());

        let page = segments
            .next()
            .map(ContextSanitizer::sanitize_page)
            .unwrap_or(Page::Home);
        let section = segments
            .next()
            .and_then(ContextSanitizer::sanitize_section)
            .or_else(|| fragment.and_then(ContextSanitizer::sanitize_section));

        ToolContext {
            current_page: page,
            current_section: section,
            ..base.clone()
        }
    }

    /// Derive a new context. Changing page drops the old section unless a new one is given.
    pub fn update(context: &ToolContext, update: ContextUpdate) -> ToolContext {
        let page_changed = update.page.is_some_and(|p| p != context.current_page);
        let section = match update.section {
            Some(s) => ContextSanitizer::sanitize_section(&s),
            None if page_changed => None,
            None => context.current_section.clone(),
        };
        ToolContext {
            current_page: update.page.unwrap_or(context.current_page),
            current_section: section,
            theme: update.theme.unwrap_or(context.theme),
            session_id: context.session_id.clone(),
            user_agent: context.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_pages_fall_back_to_home() {
        assert_eq!(ContextSanitizer::sanitize_page("blog"), Page::Home);
        assert_eq!(ContextSanitizer::sanitize_page(""), Page::Home);
        assert_eq!(ContextSanitizer::sanitize_page(" About "), Page::About);
    }

    #[test]
    fn sanitize_page_is_idempotent() {
        for input in ["resume", "RESUME", "nope", "contact", "../etc"] {
            let once = ContextSanitizer::sanitize_page(input);
            let twice = ContextSanitizer::sanitize_page(once.as_str());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn section_is_normalized() {
        assert_eq!(
            ContextSanitizer::sanitize_section("Work Experience!"),
            Some("work-experience".into())
        );
        assert_eq!(ContextSanitizer::sanitize_section("  "), None);
        let long = "a".repeat(80);
        assert_eq!(ContextSanitizer::sanitize_section(&long).unwrap().len(), MAX_SECTION_LEN);
    }

    #[test]
    fn raw_context_gets_defaults() {
        let ctx = ContextSanitizer::sanitize(&RawContext {
            page: Some("admin".into()),
            theme: Some("purple".into()),
            ..Default::default()
        });
        assert_eq!(ctx.current_page, Page::Home);
        assert_eq!(ctx.theme, Theme::Light);
        assert_eq!(ctx.session_id, "anonymous");
        assert_eq!(ctx.user_agent, "unknown");
    }

    #[test]
    fn url_path_round_trip() {
        let base = ToolContext::new(Page::Home, "s1");
        let ctx = ContextTransformer::from_url_path("/about/experience", &base);
        assert_eq!(ctx.current_page, Page::About);
        assert_eq!(ctx.current_section.as_deref(), Some("experience"));
        assert_eq!(ContextTransformer::to_url_path(&ctx), "/about#experience");

        let home = ContextTransformer::from_url_path("/", &base);
        assert_eq!(ContextTransformer::to_url_path(&home), "/");
    }

    #[test]
    fn fragment_supplies_section() {
        let base = ToolContext::new(Page::Home, "s1");
        let ctx = ContextTransformer::from_url_path("/resume?ref=x#skills", &base);
        assert_eq!(ctx.current_page, Page::Resume);
        assert_eq!(ctx.current_section.as_deref(), Some("skills"));
    }

    #[test]
    fn update_produces_new_value() {
        let ctx = ToolContext::new(Page::About, "s1").with_section("skills");
        let next = ContextTransformer::update(
            &ctx,
            ContextUpdate {
                page: Some(Page::Projects),
                ..Default::default()
            },
        );
        assert_eq!(next.current_page, Page::Projects);
        assert_eq!(next.current_section, None);
        assert_eq!(ctx.current_section.as_deref(), Some("skills"));

        let themed = ContextTransformer::update(
            &ctx,
            ContextUpdate {
                theme: Some(Theme::Dark),
                ..Default::default()
            },
        );
        assert_eq!(themed.current_section.as_deref(), Some("skills"));
        assert_eq!(themed.theme, Theme::Dark);
    }

    #[test]
    fn validator_flags_empty_session() {
        let ctx = ToolContext::new(Page::Home, " ");
        assert!(!ContextValidator::is_valid(&ctx));
        let ok = ToolContext::new(Page::Home, "abc").with_section("hero");
        assert!(ContextValidator::is_valid(&ok));
        let bad_section = ToolContext::new(Page::Home, "abc").with_section("Hero Area");
        assert_eq!(ContextValidator::validate(&bad_section).len(), 1);
        assert!(ContextValidator::validate_envelope(&bad_section).is_empty());
    }
}
