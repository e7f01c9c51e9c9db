//! Built-in portfolio tools.
//!
//! Each tool is a [`ToolHandler`] wrapped in a [`BaseTool`]; [`all`] builds
//! the full catalog for registration.

pub mod content;

use std::sync::Arc;

use async_trait::async_trait;
use folio_core::{
    ContextSanitizer, ErrorCode, Page, ParamSchema, Result, Theme, Tool, ToolAction, ToolContext, ToolError,
    ToolResult, ValidationOptions,
};
use serde_json::{Value, json};
use tracing::debug;

use crate::base::{BaseTool, ToolHandler};

/// Every built-in tool, validating with `options`.
pub fn all(options: ValidationOptions) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(BaseTool::new(NavigateToPage).with_validation(options)),
        Arc::new(BaseTool::new(ScrollToSection).with_validation(options)),
        Arc::new(BaseTool::new(ToggleTheme).with_validation(options)),
        Arc::new(BaseTool::new(DownloadResume).with_validation(options)),
        Arc::new(BaseTool::new(ShowProjects).with_validation(options)),
        Arc::new(BaseTool::new(GetSkills).with_validation(options)),
        Arc::new(BaseTool::new(GetExperience).with_validation(options)),
        Arc::new(BaseTool::new(ContactAction).with_validation(options)),
    ]
}

// ── Argument helpers ───────────────────────────────────────────

fn arg_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Accepts `true`/`false` and their string forms, which lenient validation lets through.
fn arg_bool(args: &Value, key: &str) -> Option<bool> {
    match args.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn arg_u64(args: &Value, key: &str) -> Option<u64> {
    match args.get(key)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn page_names() -> Vec<&'static str> {
    Page::ALL.iter().map(Page::as_str).collect()
}

/// Where else a section lives, for "navigate first" hints.
fn pages_with_section(section: &str) -> Vec<Page> {
    Page::ALL.into_iter().filter(|p| p.has_section(section)).collect()
}

// ── Navigation ─────────────────────────────────────────────────

pub struct NavigateToPage;

#[async_trait]
impl ToolHandler for NavigateToPage {
    fn name(&self) -> &str {
        "navigate_to_page"
    }

    fn description(&self) -> &str {
        "Navigate to a page of the portfolio, optionally landing on a section"
    }

    fn parameters(&self) -> ParamSchema {
        ParamSchema::object()
            .required(
                "page",
                ParamSchema::string_enum(page_names()).describe("The page to open"),
            )
            .optional(
                "section",
                ParamSchema::string()
                    .length(None, Some(50))
                    .describe("Section anchor on the page"),
            )
    }

    async fn run(&self, args: &Value, context: &ToolContext) -> Result<ToolResult> {
        let page = ContextSanitizer::sanitize_page(arg_str(args, "page").unwrap_or_default());
        let section = arg_str(args, "section").and_then(ContextSanitizer::sanitize_section);

        if let Some(section) = &section {
            if !page.has_section(section) {
                return Ok(ToolResult::error(
                    ErrorCode::InvalidSection,
                    format!("The {page} page has no '{section}' section"),
                    [format!("Available sections: {}", page.sections().join(", "))],
                ));
            }
        }

        debug!(from = %context.current_page, to = %page, "navigating");
        let path = match page {
            Page::Home => "/".to_string(),
            p => format!("/{p}"),
        };
        Ok(ToolResult::success(json!({
            "page": page,
            "section": section,
            "path": path,
            "previous_page": context.current_page,
        }))
        .with_action(ToolAction::navigate(page, section.as_deref())))
    }
}

pub struct ScrollToSection;

#[async_trait]
impl ToolHandler for ScrollToSection {
    fn name(&self) -> &str {
        "scroll_to_section"
    }

    fn description(&self) -> &str {
        "Scroll the current page to one of its sections"
    }

    fn parameters(&self) -> ParamSchema {
        ParamSchema::object().required(
            "section",
            ParamSchema::string()
                .length(Some(1), Some(50))
                .describe("Section anchor on the current page"),
        )
    }

    async fn run(&self, args: &Value, context: &ToolContext) -> Result<ToolResult> {
        let page = context.current_page;
        let Some(section) = arg_str(args, "section").and_then(ContextSanitizer::sanitize_section) else {
            return Ok(ToolResult::error(
                ErrorCode::InvalidSection,
                "Section name is empty",
                [format!("Available sections: {}", page.sections().join(", "))],
            ));
        };

        if !page.has_section(&section) {
            let mut error = ToolError::new(
                ErrorCode::InvalidSection,
                format!("The {page} page has no '{section}' section"),
            )
            .with_suggestion(format!("Available sections: {}", page.sections().join(", ")));
            if let Some(other) = pages_with_section(&section).first() {
                error = error.with_suggestion(format!("Navigate to the {other} page first"));
            }
            return Ok(ToolResult::failure(error));
        }

        Ok(ToolResult::success(json!({ "page": page, "section": section }))
            .with_action(ToolAction::scroll(section.as_str())?))
    }
}

// ── Theme ──────────────────────────────────────────────────────

pub struct ToggleTheme;

#[async_trait]
impl ToolHandler for ToggleTheme {
    fn name(&self) -> &str {
        "toggle_theme"
    }

    fn description(&self) -> &str {
        "Switch between light and dark theme, or set one explicitly"
    }

    fn parameters(&self) -> ParamSchema {
        ParamSchema::object().optional(
            "theme",
            ParamSchema::string_enum(["light", "dark"]).describe("Theme to switch to; toggles when omitted"),
        )
    }

    async fn run(&self, args: &Value, context: &ToolContext) -> Result<ToolResult> {
        let target = arg_str(args, "theme")
            .map(ContextSanitizer::sanitize_theme)
            .unwrap_or_else(|| context.theme.opposite());

        if target == context.theme {
            return Ok(ToolResult::error(
                ErrorCode::InvalidTheme,
                format!("The {target} theme is already active"),
                [format!("Try switching to {} instead", target.opposite())],
            ));
        }

        Ok(ToolResult::success(json!({
            "previous": context.theme,
            "theme": target,
        }))
        .with_action(ToolAction::theme(target)))
    }
}

// ── Resume ─────────────────────────────────────────────────────

pub struct DownloadResume;

#[async_trait]
impl ToolHandler for DownloadResume {
    fn name(&self) -> &str {
        "download_resume"
    }

    fn description(&self) -> &str {
        "Download the resume as PDF or DOCX"
    }

    fn parameters(&self) -> ParamSchema {
        ParamSchema::object().optional(
            "format",
            ParamSchema::string()
                .length(Some(2), Some(10))
                .describe("File format: pdf (default) or docx"),
        )
    }

    async fn run(&self, args: &Value, _context: &ToolContext) -> Result<ToolResult> {
        let format = arg_str(args, "format")
            .map(|f| f.trim().trim_start_matches('.').to_ascii_lowercase())
            .unwrap_or_else(|| "pdf".to_string());

        let Some(path) = content::resume_file(&format) else {
            let supported: Vec<&str> = content::RESUME_FILES.iter().map(|(f, _)| *f).collect();
            return Ok(ToolResult::failure(
                ToolError::new(ErrorCode::UnsupportedFile, format!("'{format}' is not an available format"))
                    .with_suggestion(format!("Supported formats: {}", supported.join(", ")))
                    .with_fallback(json!({ "format": "pdf", "url": content::RESUME_FILES[0].1 })),
            ));
        };

        let filename = format!("resume.{format}");
        Ok(ToolResult::success(json!({ "format": format, "url": path }))
            .with_action(ToolAction::download(path, filename)?))
    }
}

// ── Content ────────────────────────────────────────────────────

pub struct ShowProjects;

#[async_trait]
impl ToolHandler for ShowProjects {
    fn name(&self) -> &str {
        "show_projects"
    }

    fn description(&self) -> &str {
        "List portfolio projects, filtered by technology or featured status"
    }

    fn parameters(&self) -> ParamSchema {
        ParamSchema::object()
            .optional("technology", ParamSchema::string().describe("Only projects using this technology"))
            .optional("featured", ParamSchema::boolean().describe("Only featured projects"))
            .optional(
                "limit",
                ParamSchema::integer()
                    .range(Some(1.0), Some(20.0))
                    .describe("Maximum number of projects (default 6)"),
            )
    }

    async fn run(&self, args: &Value, context: &ToolContext) -> Result<ToolResult> {
        let limit = arg_u64(args, "limit").unwrap_or(6).clamp(1, 20) as usize;
        let projects = content::find_projects(arg_str(args, "technology"), arg_bool(args, "featured"), limit);

        let result = ToolResult::success(json!({
            "projects": projects,
            "total": projects.len(),
        }));
        if context.current_page == Page::Projects {
            Ok(result)
        } else {
            Ok(result.with_action(ToolAction::navigate(Page::Projects, None)))
        }
    }
}

pub struct GetSkills;

#[async_trait]
impl ToolHandler for GetSkills {
    fn name(&self) -> &str {
        "get_skills"
    }

    fn description(&self) -> &str {
        "List technical skills, optionally for one category"
    }

    fn parameters(&self) -> ParamSchema {
        ParamSchema::object().optional(
            "category",
            ParamSchema::string_enum(content::SKILL_CATEGORIES).describe("Skill category"),
        )
    }

    async fn run(&self, args: &Value, _context: &ToolContext) -> Result<ToolResult> {
        let category = arg_str(args, "category").map(str::to_ascii_lowercase);
        let groups: Vec<_> = content::SKILLS
            .iter()
            .filter(|g| category.as_deref().is_none_or(|c| g.category == c))
            .collect();
        Ok(ToolResult::success(json!({
            "categories": groups,
            "total": groups.iter().map(|g| g.skills.len()).sum::<usize>(),
        })))
    }
}

pub struct GetExperience;

#[async_trait]
impl ToolHandler for GetExperience {
    fn name(&self) -> &str {
        "get_experience"
    }

    fn description(&self) -> &str {
        "Summarize work experience, optionally with education"
    }

    fn parameters(&self) -> ParamSchema {
        ParamSchema::object().optional(
            "include_education",
            ParamSchema::boolean().describe("Also list education"),
        )
    }

    async fn run(&self, args: &Value, _context: &ToolContext) -> Result<ToolResult> {
        let mut data = json!({ "experience": content::EXPERIENCE });
        if arg_bool(args, "include_education").unwrap_or(false) {
            data["education"] = json!(content::EDUCATION);
        }
        Ok(ToolResult::success(data))
    }
}

// ── Contact ────────────────────────────────────────────────────

const CONTACT_ACTIONS: [&str; 4] = ["open_form", "show_email", "show_social", "schedule_call"];

pub struct ContactAction;

#[async_trait]
impl ToolHandler for ContactAction {
    fn name(&self) -> &str {
        "contact_action"
    }

    fn description(&self) -> &str {
        "Open the contact form, show contact details, or schedule a call"
    }

    fn parameters(&self) -> ParamSchema {
        ParamSchema::object().required(
            "action",
            ParamSchema::string()
                .length(Some(1), Some(50))
                .describe("One of: open_form, show_email, show_social, schedule_call"),
        )
    }

    async fn run(&self, args: &Value, _context: &ToolContext) -> Result<ToolResult> {
        let action = arg_str(args, "action").unwrap_or_default().trim().to_ascii_lowercase();
        let contact = &content::CONTACT;
        let result = match action.as_str() {
            "open_form" => ToolResult::success(json!({ "action": action }))
                .with_action(ToolAction::modal("contact-form", None)?),
            "show_email" => ToolResult::success(json!({ "action": action, "email": contact.email })),
            "show_social" => ToolResult::success(json!({ "action": action, "social": contact.social })),
            "schedule_call" => ToolResult::success(json!({ "action": action }))
                .with_action(ToolAction::modal(
                    "schedule-call",
                    Some(json!({ "availability": contact.availability })),
                )?),
            _ => ToolResult::error(
                ErrorCode::InvalidAction,
                format!("Unknown contact action '{action}'"),
                [format!("Valid actions: {}", CONTACT_ACTIONS.join(", "))],
            ),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        let tools = all(ValidationOptions::default());
        let mut names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn lenient_argument_parsing() {
        let args = json!({"limit": "3", "featured": "true", "n": 2.0});
        assert_eq!(arg_u64(&args, "limit"), Some(3));
        assert_eq!(arg_bool(&args, "featured"), Some(true));
        assert_eq!(arg_u64(&args, "n"), Some(2));
        assert_eq!(arg_str(&json!({"s": "  "}), "s"), None);
    }
}
