//! Relevance ranking of tools for a context and free text.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use folio_core::{Page, ToolContext};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_SUGGESTIONS: usize = 10;
pub const MAX_RECOMMENDATIONS: usize = 5;

const PRIMARY_RELEVANCE: f64 = 0.9;
const SECONDARY_RELEVANCE: f64 = 0.6;
const TERTIARY_RELEVANCE: f64 = 0.3;
const SECTION_BONUS: f64 = 0.2;
const THEME_RELEVANCE: f64 = 0.2;

// ── Types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn from_relevance(relevance: f64) -> Priority {
        if relevance > 0.6 {
            Priority::High
        } else if relevance > 0.3 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// A ranked tool name with the reason it was picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSuggestion {
    pub tool: String,
    /// Within `[0, 1]`.
    pub relevance: f64,
    pub reason: String,
    /// Which pass produced this, e.g. `page:about`, `intent:download`, `workflow:hiring`.
    pub context: String,
    pub priority: Priority,
}

impl ToolSuggestion {
    fn new(tool: &str, relevance: f64, reason: impl Into<String>, context: impl Into<String>) -> Self {
        let relevance = relevance.clamp(0.0, 1.0);
        Self {
            tool: tool.to_string(),
            relevance,
            reason: reason.into(),
            context: context.into(),
            priority: Priority::from_relevance(relevance),
        }
    }
}

/// Coarse purpose categories inferred from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Navigation,
    Information,
    Action,
    Contact,
    Download,
    Theme,
    Projects,
    Experience,
    Skills,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::Navigation,
        Intent::Information,
        Intent::Action,
        Intent::Contact,
        Intent::Download,
        Intent::Theme,
        Intent::Projects,
        Intent::Experience,
        Intent::Skills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Navigation => "navigation",
            Intent::Information => "information",
            Intent::Action => "action",
            Intent::Contact => "contact",
            Intent::Download => "download",
            Intent::Theme => "theme",
            Intent::Projects => "projects",
            Intent::Experience => "experience",
            Intent::Skills => "skills",
        }
    }

    /// Tools that serve this intent.
    pub fn tools(&self) -> &'static [&'static str] {
        match self {
            Intent::Navigation => &["navigate_to_page", "scroll_to_section"],
            Intent::Information => &["get_experience", "get_skills"],
            Intent::Action => &["navigate_to_page", "toggle_theme"],
            Intent::Contact => &["contact_action"],
            Intent::Download => &["download_resume"],
            Intent::Theme => &["toggle_theme"],
            Intent::Projects => &["show_projects"],
            Intent::Experience => &["get_experience"],
            Intent::Skills => &["get_skills"],
        }
    }

    fn patterns(&self) -> &'static [&'static str] {
        match self {
            Intent::Navigation => &[
                r"\b(?:go to|navigate|take me|bring me|open the)\b",
                r"\b(?:page|section)\b",
            ],
            Intent::Information => &[
                r"\b(?:tell me|what|who|explain|describe)\b",
                r"\b(?:more about|details|information|info)\b",
            ],
            Intent::Action => &[r"\b(?:can you|please|switch|change|turn)\b"],
            Intent::Contact => &[
                r"\b(?:contact|email|reach|get in touch|hire|message)\b",
                r"\b(?:schedule|meeting|call)\b",
            ],
            Intent::Download => &[
                r"\b(?:download|save|pdf|docx|copy of)\b",
                r"\b(?:resume|cv)\b",
            ],
            Intent::Theme => &[
                r"\b(?:theme|dark mode|light mode|night mode)\b",
                r"\b(?:too bright|too dark|my eyes)\b",
            ],
            Intent::Projects => &[
                r"\b(?:projects?|portfolio|built|apps?|demos?)\b",
                r"\b(?:github|open[- ]source|code samples?)\b",
            ],
            Intent::Experience => &[
                r"\b(?:experience|jobs?|career|worked|employment|roles?)\b",
                r"\b(?:education|degree|university)\b",
            ],
            Intent::Skills => &[
                r"\b(?:skills?|technolog(?:y|ies)|languages?|frameworks?|tech stack)\b",
                r"\b(?:proficient|expert|expertise)\b",
            ],
        }
    }
}

/// An intent found in text, with its accumulated confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedIntent {
    pub intent: Intent,
    pub confidence: f64,
    pub matches: Vec<String>,
}

// ── Tables ─────────────────────────────────────────────────────

struct PageTiers {
    primary: &'static [&'static str],
    secondary: &'static [&'static str],
    tertiary: &'static [&'static str],
}

fn page_tiers(page: Page) -> PageTiers {
    match page {
        Page::Home => PageTiers {
            primary: &["navigate_to_page", "show_projects"],
            secondary: &["get_skills", "get_experience"],
            tertiary: &["download_resume", "contact_action"],
        },
        Page::About => PageTiers {
            primary: &["get_experience", "get_skills"],
            secondary: &["download_resume", "scroll_to_section"],
            tertiary: &["contact_action", "navigate_to_page"],
        },
        Page::Projects => PageTiers {
            primary: &["show_projects"],
            secondary: &["get_skills", "scroll_to_section"],
            tertiary: &["contact_action", "navigate_to_page"],
        },
        Page::Resume => PageTiers {
            primary: &["download_resume", "get_experience"],
            secondary: &["get_skills", "scroll_to_section"],
            tertiary: &["contact_action"],
        },
        Page::Contact => PageTiers {
            primary: &["contact_action"],
            secondary: &["download_resume"],
            tertiary: &["navigate_to_page", "show_projects"],
        },
    }
}

fn section_tools(section: &str) -> &'static [&'static str] {
    match section {
        "experience" => &["get_experience", "download_resume"],
        "skills" => &["get_skills", "show_projects"],
        "education" | "bio" => &["get_experience"],
        "achievements" => &["get_experience", "show_projects"],
        "featured" | "all" | "open-source" => &["show_projects"],
        "summary" => &["download_resume"],
        "form" | "social" | "availability" => &["contact_action"],
        "hero" | "highlights" => &["navigate_to_page", "show_projects"],
        _ => &[],
    }
}

fn complementary_tools(tool: &str) -> &'static [&'static str] {
    match tool {
        "navigate_to_page" => &["scroll_to_section", "show_projects"],
        "scroll_to_section" => &["navigate_to_page"],
        "show_projects" => &["get_skills", "contact_action"],
        "get_skills" => &["show_projects", "get_experience"],
        "get_experience" => &["download_resume", "get_skills"],
        "download_resume" => &["contact_action"],
        "contact_action" => &["download_resume"],
        "toggle_theme" => &["navigate_to_page"],
        _ => &[],
    }
}

/// Named tool sequences users tend to walk through.
const WORKFLOWS: [(&str, &[&str]); 4] = [
    (
        "hiring_evaluation",
        &["get_experience", "get_skills", "download_resume", "contact_action"],
    ),
    ("portfolio_tour", &["navigate_to_page", "show_projects", "get_skills"]),
    ("quick_contact", &["download_resume", "contact_action"]),
    ("technical_deep_dive", &["get_skills", "show_projects", "get_experience"]),
];

static INTENT_PATTERNS: LazyLock<Vec<(Intent, Vec<Regex>)>> = LazyLock::new(|| {
    Intent::ALL
        .into_iter()
        .map(|intent| {
            let patterns = intent
                .patterns()
                .iter()
                .map(|p| Regex::new(p).expect("valid intent pattern"))
                .collect();
            (intent, patterns)
        })
        .collect()
});

/// Every tool name any table refers to.
pub fn known_tools() -> Vec<&'static str> {
    let mut tools: Vec<&'static str> = Page::ALL
        .into_iter()
        .flat_map(|p| {
            let t = page_tiers(p);
            t.primary.iter().chain(t.secondary).chain(t.tertiary).copied().collect::<Vec<_>>()
        })
        .chain(["toggle_theme"])
        .collect();
    tools.sort_unstable();
    tools.dedup();
    tools
}

// ── Engine ─────────────────────────────────────────────────────

/// Ranks tool names; never executes anything.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    available: Option<HashSet<String>>,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict all output to these tool names.
    pub fn with_available_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    fn is_available(&self, tool: &str) -> bool {
        self.available.as_ref().is_none_or(|set| set.contains(tool))
    }

    /// Score each intent by its patterns' matches in `text`.
    ///
    /// Every pattern that matches is worth 0.3, plus 0.1 for each of its
    /// matches beyond the first.
    pub fn detect_intents(&self, text: &str) -> Vec<DetectedIntent> {
        let lowered = text.to_lowercase();
        let mut detected = Vec::new();
        for (intent, patterns) in INTENT_PATTERNS.iter() {
            let mut matches: Vec<String> = Vec::new();
            let mut confidence = 0.0;
            for pattern in patterns {
                let found: Vec<String> = pattern.find_iter(&lowered).map(|m| m.as_str().to_string()).collect();
                if found.is_empty() {
                    continue;
                }
                confidence += 0.3 + 0.1 * (found.len() - 1) as f64;
                matches.extend(found);
            }
            if matches.is_empty() {
                continue;
            }
            detected.push(DetectedIntent {
                intent: *intent,
                confidence,
                matches,
            });
        }
        detected
    }

    /// Page tiers, section bonus, text intents, and the theme toggle, merged and ranked.
    pub fn contextual_suggestions(&self, context: &ToolContext, text: Option<&str>) -> Vec<ToolSuggestion> {
        let mut suggestions = self.page_suggestions(context);

        if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
            for detected in self.detect_intents(text) {
                for tool in detected.intent.tools() {
                    suggestions.push(ToolSuggestion::new(
                        tool,
                        detected.confidence,
                        format!("Matches your {} request", detected.intent.as_str()),
                        format!("intent:{}", detected.intent.as_str()),
                    ));
                }
            }
        }

        suggestions.push(ToolSuggestion::new(
            "toggle_theme",
            THEME_RELEVANCE,
            format!("Switch to {} theme", context.theme.opposite()),
            "theme",
        ));

        let ranked = self.rank(suggestions, MAX_SUGGESTIONS);
        debug!(page = %context.current_page, count = ranked.len(), "contextual suggestions");
        ranked
    }

    /// Contextual suggestions plus tools that pair with recent usage and
    /// the next steps of partially walked workflows.
    pub fn smart_recommendations(
        &self,
        context: &ToolContext,
        text: Option<&str>,
        recent_usage: &[String],
    ) -> Vec<ToolSuggestion> {
        let mut suggestions = self.contextual_suggestions(context, text);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for tool in recent_usage {
            let count = counts.entry(tool.as_str()).or_insert(0);
            if *count == 0 {
                order.push(tool.as_str());
            }
            *count += 1;
        }

        for used in &order {
            let relevance = (0.4 + 0.1 * counts[used] as f64).min(0.8);
            for complement in complementary_tools(used) {
                if counts.contains_key(complement) {
                    continue;
                }
                suggestions.push(ToolSuggestion::new(
                    complement,
                    relevance,
                    format!("Pairs well with {used}"),
                    "complementary",
                ));
            }
        }

        for (name, steps) in WORKFLOWS {
            let matched = steps.iter().filter(|s| counts.contains_key(*s)).count();
            if matched == 0 || matched == steps.len() {
                continue;
            }
            let relevance = (0.6 + 0.1 * matched as f64).min(1.0);
            for step in steps.iter().filter(|s| !counts.contains_key(*s)) {
                suggestions.push(ToolSuggestion::new(
                    step,
                    relevance,
                    format!("Next step in the {} workflow", name.replace('_', " ")),
                    format!("workflow:{name}"),
                ));
            }
        }

        self.rank(suggestions, MAX_RECOMMENDATIONS)
    }

    /// Keep only the tools that make sense on `page`, in input order.
    pub fn filter_tools_by_context<S: AsRef<str>>(&self, page: Page, tools: &[S]) -> Vec<String> {
        let tiers = page_tiers(page);
        tools
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| {
                *t == "toggle_theme"
                    || tiers.primary.contains(t)
                    || tiers.secondary.contains(t)
                    || tiers.tertiary.contains(t)
            })
            .filter(|t| self.is_available(t))
            .map(str::to_string)
            .collect()
    }

    fn page_suggestions(&self, context: &ToolContext) -> Vec<ToolSuggestion> {
        let page = context.current_page;
        let tiers = page_tiers(page);
        let relevant_to_section = context.current_section.as_deref().map(section_tools).unwrap_or(&[]);

        let mut out = Vec::new();
        let graded = [
            (tiers.primary, PRIMARY_RELEVANCE, "Primary"),
            (tiers.secondary, SECONDARY_RELEVANCE, "Useful"),
            (tiers.tertiary, TERTIARY_RELEVANCE, "Related"),
        ];
        for (tools, relevance, label) in graded {
            for tool in tools {
                let mut reason = format!("{label} tool for the {page} page");
                let mut relevance = relevance;
                if relevant_to_section.contains(tool) {
                    relevance = (relevance + SECTION_BONUS).min(1.0);
                    if let Some(section) = &context.current_section {
                        reason.push_str(&format!(" (relevant to {section})"));
                    }
                }
                out.push(ToolSuggestion::new(tool, relevance, reason, format!("page:{page}")));
            }
        }
        out
    }

    /// Filter to available tools, keep the best entry per tool, sort, truncate.
    fn rank(&self, suggestions: Vec<ToolSuggestion>, limit: usize) -> Vec<ToolSuggestion> {
        let mut best: HashMap<String, ToolSuggestion> = HashMap::new();
        for s in suggestions.into_iter().filter(|s| self.is_available(&s.tool)) {
            if best.get(&s.tool).is_none_or(|existing| s.relevance > existing.relevance) {
                best.insert(s.tool.clone(), s);
            }
        }
        let mut ranked: Vec<ToolSuggestion> = best.into_values().collect();
        ranked.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| a.tool.cmp(&b.tool))
        });
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_thresholds() {
        assert_eq!(Priority::from_relevance(0.9), Priority::High);
        assert_eq!(Priority::from_relevance(0.6), Priority::Medium);
        assert_eq!(Priority::from_relevance(0.3), Priority::Low);
    }

    #[test]
    fn intent_confidence_accumulates() {
        let engine = SuggestionEngine::new();
        let intents = engine.detect_intents("download the resume as pdf");
        let download = intents
            .iter()
            .find(|d| d.intent == Intent::Download)
            .unwrap();
        // "download" and "pdf" from one pattern, "resume" from the other
        assert_eq!(download.matches.len(), 3);
        assert!((download.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn intent_from_two_patterns_is_high_priority() {
        let engine = SuggestionEngine::new();
        let s = engine.contextual_suggestions(&ToolContext::new(Page::Home, "s1"), Some("download the resume as pdf"));
        let download = s.iter().find(|s| s.tool == "download_resume").unwrap();
        assert!((download.relevance - 0.7).abs() < 1e-9);
        assert_eq!(download.priority, Priority::High);
        assert_eq!(download.context, "intent:download");
    }

    #[test]
    fn known_tools_cover_the_catalog() {
        let tools = known_tools();
        assert_eq!(tools.len(), 8);
        assert!(tools.contains(&"toggle_theme"));
    }

    #[test]
    fn workflows_only_use_known_tools() {
        let known = known_tools();
        for (_, steps) in WORKFLOWS {
            assert!(steps.iter().all(|s| known.contains(s)));
        }
    }
}
