//! Heuristic page-context detection.
//!
//! Each signal (URL, chat text, navigation history, referrer) is classified
//! independently into a [`PageContextDetection`]. [`PageContextDetector::detect_from_multiple_sources`]
//! fuses whatever signals the caller has, preferring the most confident one and
//! rewarding agreement in numbers.

use std::collections::VecDeque;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use folio_core::{ContextSanitizer, Page};
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;
use url::Url;

/// Entries kept in the context-change log.
pub const TRACKING_CAPACITY: usize = 50;

const URL_CONFIDENCE: f64 = 0.95;
const UNKNOWN_PATH_CONFIDENCE: f64 = 0.7;
const FALLBACK_CONFIDENCE: f64 = 0.1;
const MAX_CHAT_PAGE_CONFIDENCE: f64 = 0.9;

static LOCAL_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").expect("valid base url"));

// ── Types ──────────────────────────────────────────────────────

/// Which signal produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    Url,
    Referrer,
    Chat,
    Navigation,
    Default,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::Url => "url",
            DetectionSource::Referrer => "referrer",
            DetectionSource::Chat => "chat",
            DetectionSource::Navigation => "navigation",
            DetectionSource::Default => "default",
        }
    }

    pub fn from_name(name: &str) -> Option<DetectionSource> {
        match name {
            "url" => Some(DetectionSource::Url),
            "referrer" => Some(DetectionSource::Referrer),
            "chat" => Some(DetectionSource::Chat),
            "navigation" => Some(DetectionSource::Navigation),
            "default" => Some(DetectionSource::Default),
            _ => None,
        }
    }
}

impl std::fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A guess at where the user is, with how sure we are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContextDetection {
    pub page: Page,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub source: DetectionSource,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl PageContextDetection {
    pub fn new(page: Page, section: Option<String>, confidence: f64, source: DetectionSource) -> Self {
        Self {
            page,
            section,
            confidence: confidence.clamp(0.0, 1.0),
            source,
            metadata: Map::new(),
        }
    }

    /// The "nothing to go on" answer.
    pub fn fallback(source: DetectionSource) -> Self {
        Self::new(Page::Home, None, FALLBACK_CONFIDENCE, source)
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// The signals a caller can hand to [`PageContextDetector::detect_from_multiple_sources`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSources {
    pub url: Option<String>,
    pub chat_message: Option<String>,
    pub navigation_history: Vec<String>,
    pub referrer: Option<String>,
}

/// One entry in the context-change log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextTrackingEntry {
    pub timestamp: DateTime<Utc>,
    pub context: PageContextDetection,
    pub source: DetectionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_context: Option<PageContextDetection>,
}

/// Result of checking an untrusted detection payload.
#[derive(Debug, Clone, Serialize)]
pub struct ContextValidation {
    /// The repaired detection; usable even when `valid` is false.
    pub context: PageContextDetection,
    pub errors: Vec<String>,
    pub valid: bool,
}

// ── Pattern tables ─────────────────────────────────────────────

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid detector pattern"))
        .collect()
}

/// Phrases that point at a page, in page order.
static PAGE_PATTERNS: LazyLock<Vec<(Page, Vec<Regex>)>> = LazyLock::new(|| {
    vec![
        (
            Page::Home,
            compile(&[
                r"\b(?:home|homepage|main page|landing page|start page)\b",
                r"\b(?:go|take me) back\b",
            ]),
        ),
        (
            Page::About,
            compile(&[
                r"\babout (?:yourself|your|you|me)\b",
                r"\b(?:who are you|your background|bio|biography)\b",
            ]),
        ),
        (
            Page::Projects,
            compile(&[
                r"\b(?:projects?|portfolio|side projects?|demos?)\b",
                r"\bwhat (?:have you|did you) (?:built|build|made|make)\b",
            ]),
        ),
        (
            Page::Resume,
            compile(&[r"\b(?:resume|résumé|cv|curriculum vitae)\b"]),
        ),
        (
            Page::Contact,
            compile(&[
                r"\b(?:contact|get in touch|reach (?:you|out)|email you|hire you)\b",
                r"\bsend (?:you )?a message\b",
            ]),
        ),
    ]
});

/// Phrases that point at a section, with the page that owns it.
static SECTION_PATTERNS: LazyLock<Vec<(&'static str, Page, Vec<Regex>)>> = LazyLock::new(|| {
    vec![
        (
            "skills",
            Page::About,
            compile(&[r"\b(?:skills?|tech stack|technologies|programming languages)\b"]),
        ),
        (
            "experience",
            Page::About,
            compile(&[r"\b(?:experience|jobs?|career|employment|worked at)\b"]),
        ),
        (
            "education",
            Page::About,
            compile(&[r"\b(?:education|degrees?|university|college|studied)\b"]),
        ),
        (
            "achievements",
            Page::About,
            compile(&[r"\b(?:achievements?|awards?|certifications?|accomplishments?)\b"]),
        ),
        ("projects", Page::Projects, compile(&[r"\bprojects?\b"])),
    ]
});

/// Scores one pattern against a lowercased message. `None` when it does not match.
fn score_pattern(pattern: &Regex, message: &str) -> Option<f64> {
    let matches: Vec<_> = pattern.find_iter(message).collect();
    let first = matches.first()?;

    let mut score = 0.3;
    if first.as_str().chars().count() > 3 {
        score += 0.1;
    }
    if first.start() == 0 {
        score += 0.1;
    }
    score += (0.1 * (matches.len() - 1) as f64).min(0.2);
    if message.chars().count() < 50 {
        score += 0.1;
    }
    Some(score)
}

fn score_patterns(patterns: &[Regex], message: &str) -> f64 {
    patterns
        .iter()
        .filter_map(|p| score_pattern(p, message))
        .sum::<f64>()
        .min(MAX_CHAT_PAGE_CONFIDENCE)
}

/// Resolve a first path segment, accepting a few common aliases.
fn lookup_page(segment: &str) -> Option<Page> {
    let segment = segment.to_ascii_lowercase();
    Page::from_name(&segment).or(match segment.as_str() {
        "cv" => Some(Page::Resume),
        "work" | "portfolio" => Some(Page::Projects),
        "bio" => Some(Page::About),
        _ => None,
    })
}

// ── Detector ───────────────────────────────────────────────────

/// Classifies context signals and keeps a bounded log of context changes.
///
/// Detection methods are pure; only the tracking log is stateful.
pub struct PageContextDetector {
    tracking: Mutex<VecDeque<ContextTrackingEntry>>,
    capacity: usize,
}

impl Default for PageContextDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PageContextDetector {
    pub fn new() -> Self {
        Self::with_capacity(TRACKING_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tracking: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Classify an absolute URL or a site-relative path such as `/about#skills`.
    pub fn detect_from_url(&self, url: &str) -> PageContextDetection {
        let parsed = if url.starts_with('/') {
            LOCAL_BASE.join(url)
        } else {
            Url::parse(url)
        };
        let parsed = match parsed {
            Ok(u) => u,
            Err(e) => {
                debug!(url, error = %e, "url detection failed to parse");
                return PageContextDetection::fallback(DetectionSource::Url)
                    .with_metadata("url", json!(url))
                    .with_metadata("error", json!(e.to_string()));
            }
        };

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let (page, confidence) = match segments.first() {
            None => (Page::Home, URL_CONFIDENCE),
            Some(first) => match lookup_page(first) {
                Some(page) => (page, URL_CONFIDENCE),
                None => (Page::Home, UNKNOWN_PATH_CONFIDENCE),
            },
        };
        let section = segments
            .get(1)
            .and_then(|s| ContextSanitizer::sanitize_section(s))
            .or_else(|| parsed.fragment().and_then(ContextSanitizer::sanitize_section));

        PageContextDetection::new(page, section, confidence, DetectionSource::Url)
            .with_metadata("url", json!(url))
            .with_metadata("path", json!(parsed.path()))
    }

    /// Classify free chat text by phrase patterns.
    pub fn detect_from_chat_message(&self, message: &str) -> PageContextDetection {
        let lowered = message.trim().to_lowercase();
        if lowered.is_empty() {
            return PageContextDetection::fallback(DetectionSource::Chat);
        }

        let mut best_section: Option<(&'static str, Page, f64)> = None;
        for (section, owner, patterns) in SECTION_PATTERNS.iter() {
            let score = score_patterns(patterns, &lowered);
            if score > 0.0 && best_section.is_none_or(|(_, _, best)| score > best) {
                best_section = Some((section, *owner, score));
            }
        }
        let section_owner = best_section.map(|(_, owner, _)| owner);

        // On a tie the page that owns the matched section wins.
        let mut best_page: Option<(Page, f64)> = None;
        for (page, patterns) in PAGE_PATTERNS.iter() {
            let score = score_patterns(patterns, &lowered);
            let better = best_page
                .is_none_or(|(_, best)| score > best || (score == best && section_owner == Some(*page)));
            if score > 0.0 && better {
                best_page = Some((*page, score));
            }
        }

        let detection = match (best_page, best_section) {
            (Some((page, score)), section) => {
                // Only sections that live on the chosen page, and aren't the page itself, refine it.
                let section = section.filter(|(name, _, _)| *name != page.as_str() && page.has_section(name));
                match section {
                    Some((name, _, _)) => PageContextDetection::new(
                        page,
                        Some(name.to_string()),
                        (score + 0.1).min(1.0),
                        DetectionSource::Chat,
                    ),
                    None => PageContextDetection::new(page, None, score, DetectionSource::Chat),
                }
            }
            (None, Some((name, owner, _))) => {
                PageContextDetection::new(owner, Some(name.to_string()), 0.3 + 0.1, DetectionSource::Chat)
            }
            (None, None) => PageContextDetection::fallback(DetectionSource::Chat),
        };

        debug!(
            page = %detection.page,
            section = ?detection.section,
            confidence = detection.confidence,
            "chat detection"
        );
        detection
    }

    /// Classify from the most recent navigation entry.
    pub fn detect_from_navigation(&self, history: &[String]) -> PageContextDetection {
        let Some(last) = history.last() else {
            return PageContextDetection::fallback(DetectionSource::Navigation);
        };
        let recent: Vec<&String> = history.iter().rev().take(3).rev().collect();

        let mut detection = self.detect_from_url(last);
        detection.confidence = (detection.confidence + 0.05).min(1.0);
        detection.source = DetectionSource::Navigation;
        detection.with_metadata("recent_history", json!(recent))
    }

    /// Classify from a referrer; slightly less trusted than the current URL.
    pub fn detect_from_referrer(&self, referrer: &str) -> PageContextDetection {
        let mut detection = self.detect_from_url(referrer);
        detection.confidence = (detection.confidence - 0.1).max(0.0);
        detection.source = DetectionSource::Referrer;
        detection.with_metadata("referrer", json!(referrer))
    }

    /// Run every supplied detector and fuse the results.
    ///
    /// The most confident detection wins (earliest source on ties). Each
    /// additional source adds 0.05 confidence, capped at 1.0.
    pub fn detect_from_multiple_sources(&self, sources: &DetectionSources) -> PageContextDetection {
        let mut detections = Vec::new();
        if let Some(url) = sources.url.as_deref() {
            detections.push(self.detect_from_url(url));
        }
        if let Some(message) = sources.chat_message.as_deref() {
            detections.push(self.detect_from_chat_message(message));
        }
        if !sources.navigation_history.is_empty() {
            detections.push(self.detect_from_navigation(&sources.navigation_history));
        }
        if let Some(referrer) = sources.referrer.as_deref() {
            detections.push(self.detect_from_referrer(referrer));
        }

        if detections.is_empty() {
            return PageContextDetection::fallback(DetectionSource::Default);
        }

        let consulted: Vec<&str> = detections.iter().map(|d| d.source.as_str()).collect();
        let consulted = json!(consulted);
        let count = detections.len();

        let mut best_index = 0;
        for (i, d) in detections.iter().enumerate() {
            if d.confidence > detections[best_index].confidence {
                best_index = i;
            }
        }

        let mut merged = Map::new();
        for (i, d) in detections.iter().enumerate() {
            if i == best_index {
                continue;
            }
            for (k, v) in &d.metadata {
                merged.insert(k.clone(), v.clone());
            }
        }

        let mut best = detections.swap_remove(best_index);
        for (k, v) in std::mem::take(&mut best.metadata) {
            merged.insert(k, v);
        }
        merged.insert("sources_consulted".into(), consulted);
        best.metadata = merged;
        best.confidence = (best.confidence + 0.05 * (count - 1) as f64).min(1.0);

        debug!(
            page = %best.page,
            source = %best.source,
            confidence = best.confidence,
            sources = count,
            "multi-source detection"
        );
        best
    }

    // ── Tracking ───────────────────────────────────────────────

    /// Append a detection to the change log, evicting the oldest past capacity.
    pub fn track_context(&self, detection: PageContextDetection) {
        let mut log = self.tracking.lock();
        let previous_context = log.back().map(|e| e.context.clone());
        if self.capacity == 0 {
            return;
        }
        while log.len() >= self.capacity {
            log.pop_front();
        }
        log.push_back(ContextTrackingEntry {
            timestamp: Utc::now(),
            source: detection.source,
            context: detection,
            previous_context,
        });
    }

    /// Oldest first.
    pub fn tracking_history(&self) -> Vec<ContextTrackingEntry> {
        self.tracking.lock().iter().cloned().collect()
    }

    pub fn current_context(&self) -> Option<PageContextDetection> {
        self.tracking.lock().back().map(|e| e.context.clone())
    }

    pub fn clear_tracking(&self) {
        self.tracking.lock().clear();
    }

    /// A change is a different page or a different section.
    pub fn has_context_changed(previous: Option<&PageContextDetection>, current: &PageContextDetection) -> bool {
        match previous {
            None => true,
            Some(prev) => prev.page != current.page || prev.section != current.section,
        }
    }

    /// Check and repair a detection received as untyped JSON.
    pub fn validate_detected_context(value: &Value) -> ContextValidation {
        let mut errors = Vec::new();

        let page = match value.get("page") {
            Some(Value::String(s)) => match Page::from_name(s) {
                Some(p) => p,
                None => {
                    errors.push(format!("invalid page '{s}', using home"));
                    Page::Home
                }
            },
            Some(other) => {
                errors.push(format!("page must be a string, got {other}"));
                Page::Home
            }
            None => {
                errors.push("page is missing, using home".to_string());
                Page::Home
            }
        };

        let section = match value.get("section") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => ContextSanitizer::sanitize_section(s),
            Some(other) => {
                errors.push(format!("section must be a string, got {other}"));
                None
            }
        };

        let confidence = match value.get("confidence").and_then(Value::as_f64) {
            Some(c) if (0.0..=1.0).contains(&c) => c,
            Some(c) => {
                errors.push(format!("confidence {c} is outside [0, 1]"));
                c.clamp(0.0, 1.0)
            }
            None => {
                errors.push("confidence must be a number".to_string());
                FALLBACK_CONFIDENCE
            }
        };

        let source = match value.get("source") {
            Some(Value::String(s)) => DetectionSource::from_name(s).unwrap_or_else(|| {
                errors.push(format!("unknown source '{s}'"));
                DetectionSource::Default
            }),
            _ => DetectionSource::Default,
        };

        let mut context = PageContextDetection::new(page, section, confidence, source);
        if let Some(Value::Object(meta)) = value.get("metadata") {
            context.metadata = meta.clone();
        }

        ContextValidation {
            valid: errors.is_empty(),
            context,
            errors,
        }
    }
}
