use serde::{Deserialize, Serialize};

/// Opaque session identifier supplied by the hosting application.
pub type SessionId = String;

/// The closed set of pages the portfolio site exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Home,
    About,
    Projects,
    Resume,
    Contact,
}

impl Page {
    /// Every page, in navigation order.
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::About,
        Page::Projects,
        Page::Resume,
        Page::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
            Page::Projects => "projects",
            Page::Resume => "resume",
            Page::Contact => "contact",
        }
    }

    /// Strict lookup. Use [`crate::ContextSanitizer::sanitize_page`] for untrusted input.
    pub fn from_name(name: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Sections that exist on this page.
    pub fn sections(&self) -> &'static [&'static str] {
        match self {
            Page::Home => &["hero", "featured", "highlights"],
            Page::About => &["bio", "experience", "education", "skills", "achievements"],
            Page::Projects => &["featured", "all", "open-source"],
            Page::Resume => &["summary", "experience", "education", "skills", "achievements"],
            Page::Contact => &["form", "social", "availability"],
        }
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections().contains(&section)
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn opposite(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        match name {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the caller's environment, passed to every tool invocation.
///
/// Built fresh per request by the hosting application. The framework never
/// mutates a context; see [`crate::ContextTransformer::update`] for deriving a
/// new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContext {
    pub current_page: Page,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_section: Option<String>,
    pub theme: Theme,
    pub session_id: SessionId,
    pub user_agent: String,
}

impl ToolContext {
    pub fn new(page: Page, session_id: impl Into<String>) -> Self {
        Self {
            current_page: page,
            current_section: None,
            theme: Theme::Light,
            session_id: session_id.into(),
            user_agent: "unknown".into(),
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.current_section = Some(section.into());
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Untrusted, all-string context as produced by a browser or server collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawContext {
    pub page: Option<String>,
    pub section: Option<String>,
    pub theme: Option<String>,
    pub session_id: Option<String>,
    pub user_agent: Option<String>,
}
