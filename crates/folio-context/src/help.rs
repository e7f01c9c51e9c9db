//! Canned per-page guidance.

use folio_core::{ContextSanitizer, Page};
use serde::Serialize;

/// What a user can do on a page, and what they might ask.
#[derive(Debug, Clone, Serialize)]
pub struct ContextualHelp {
    pub page: Page,
    pub description: &'static str,
    pub actions: &'static [&'static str],
    pub questions: &'static [&'static str],
    pub navigation_hints: &'static [&'static str],
}

static HELP: [ContextualHelp; 5] = [
    ContextualHelp {
        page: Page::Home,
        description: "Overview of the portfolio with featured work and highlights.",
        actions: &[
            "Browse featured projects",
            "Jump to any page",
            "Switch between light and dark theme",
        ],
        questions: &[
            "What kind of work do you do?",
            "Show me your best projects",
            "How can I contact you?",
        ],
        navigation_hints: &[
            "Ask to go to the about page for background",
            "Ask for the resume to see the full history",
        ],
    },
    ContextualHelp {
        page: Page::About,
        description: "Background, experience, education, skills, and achievements.",
        actions: &[
            "Review work experience",
            "List skills by category",
            "Download the resume",
        ],
        questions: &[
            "Tell me about your work experience",
            "What technologies do you know?",
            "Where did you study?",
        ],
        navigation_hints: &[
            "Scroll to experience, education, skills, or achievements",
            "Ask to see projects that use a skill",
        ],
    },
    ContextualHelp {
        page: Page::Projects,
        description: "Featured and open-source projects with their technology stacks.",
        actions: &[
            "Filter projects by technology",
            "Show only featured projects",
            "See related skills",
        ],
        questions: &[
            "Which projects use Rust?",
            "What is your favorite project?",
            "Do you have open-source work?",
        ],
        navigation_hints: &[
            "Scroll to featured, all, or open-source",
            "Ask to get in touch about a project",
        ],
    },
    ContextualHelp {
        page: Page::Resume,
        description: "The full resume: summary, experience, education, skills, and achievements.",
        actions: &[
            "Download the resume as PDF or DOCX",
            "Review experience entries",
            "List skills",
        ],
        questions: &[
            "Can I download your resume?",
            "How many years of experience do you have?",
            "What certifications do you hold?",
        ],
        navigation_hints: &[
            "Scroll to summary, experience, education, skills, or achievements",
            "Ask to go to contact to reach out",
        ],
    },
    ContextualHelp {
        page: Page::Contact,
        description: "Ways to get in touch: contact form, social links, and availability.",
        actions: &[
            "Open the contact form",
            "Show email and social links",
            "Check availability",
        ],
        questions: &[
            "How can I reach you?",
            "Are you available for new work?",
            "What is your email?",
        ],
        navigation_hints: &[
            "Scroll to form, social, or availability",
            "Ask for the resume before reaching out",
        ],
    },
];

pub fn contextual_help(page: Page) -> &'static ContextualHelp {
    HELP.iter().find(|h| h.page == page).unwrap_or(&HELP[0])
}

/// Lookup by untrusted page name; unknown names get the home entry.
pub fn contextual_help_for(page: &str) -> &'static ContextualHelp {
    contextual_help(ContextSanitizer::sanitize_page(page))
}
