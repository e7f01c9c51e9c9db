//! Argument screening before execution and result sanitizing after.

use std::sync::LazyLock;

use folio_config::SecurityConfig;
use folio_core::{FolioError, Result, ToolContext};
use regex::Regex;
use serde_json::Value;
use tracing::info;

/// Outcome of screening one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenVerdict {
    /// Call may proceed.
    Allow,
    /// Call is rejected, with the reason.
    Deny(String),
}

/// What a rule sees of a pending call.
#[derive(Debug, Clone, Copy)]
pub struct ScreenRequest<'a> {
    pub tool: &'a str,
    /// Arguments serialized as JSON.
    pub serialized_args: &'a str,
    pub context: &'a ToolContext,
}

/// A single screening rule.
pub trait SecurityRule: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate(&self, request: &ScreenRequest<'_>) -> ScreenVerdict;
}

/// Applies every registered rule to a call; the first denial wins.
pub struct SecurityScreen {
    rules: Vec<Box<dyn SecurityRule>>,
}

impl Default for SecurityScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityScreen {
    /// Built-in rules with default limits.
    pub fn new() -> Self {
        let mut screen = Self { rules: Vec::new() };
        screen.add_rule(Box::new(ArgumentSizeRule { max_bytes: 10_000 }));
        screen.add_rule(Box::new(UnsafeContentRule::builtin()));
        screen
    }

    /// Built-in rules sized by the config, plus configured patterns and the auth rule.
    pub fn from_config(config: &SecurityConfig) -> Result<Self> {
        let mut extra = Vec::with_capacity(config.blocked_patterns.len());
        for pattern in &config.blocked_patterns {
            let re = Regex::new(pattern).map_err(|e| FolioError::ConfigValidation {
                field: "security.blocked_patterns".into(),
                reason: format!("'{pattern}': {e}"),
            })?;
            extra.push(re);
        }

        let mut screen = Self { rules: Vec::new() };
        screen.add_rule(Box::new(ArgumentSizeRule {
            max_bytes: config.max_argument_size,
        }));
        let mut content = UnsafeContentRule::builtin();
        content.patterns.extend(extra);
        screen.add_rule(Box::new(content));
        if config.require_auth {
            screen.add_rule(Box::new(RequireSessionRule));
        }
        Ok(screen)
    }

    pub fn add_rule(&mut self, rule: Box<dyn SecurityRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Screen a call against all rules.
    pub fn evaluate(&self, tool: &str, args: &Value, context: &ToolContext) -> ScreenVerdict {
        let serialized_args = args.to_string();
        let request = ScreenRequest {
            tool,
            serialized_args: &serialized_args,
            context,
        };
        for rule in &self.rules {
            if let verdict @ ScreenVerdict::Deny(_) = rule.evaluate(&request) {
                info!(rule = rule.name(), tool, "security screen denied call");
                return verdict;
            }
        }
        ScreenVerdict::Allow
    }
}

// ── Built-in rules ─────────────────────────────────────────────

/// Caps the serialized argument size.
struct ArgumentSizeRule {
    max_bytes: usize,
}

impl SecurityRule for ArgumentSizeRule {
    fn name(&self) -> &str {
        "argument_size"
    }

    fn evaluate(&self, request: &ScreenRequest<'_>) -> ScreenVerdict {
        let size = request.serialized_args.len();
        if size > self.max_bytes {
            ScreenVerdict::Deny(format!(
                "arguments are {size} bytes, the limit is {}",
                self.max_bytes
            ))
        } else {
            ScreenVerdict::Allow
        }
    }
}

static UNSAFE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)<\s*script\b",
        r"(?i)\b(?:javascript|vbscript):",
        r"(?i)\bdata:[a-z]+/[a-z0-9.+-]+",
        r"(?i)\bon[a-z]+\s*=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid unsafe-content pattern"))
    .collect()
});

/// Rejects script tags, script-bearing URIs, and inline event handlers.
struct UnsafeContentRule {
    patterns: Vec<Regex>,
}

impl UnsafeContentRule {
    fn builtin() -> Self {
        Self {
            patterns: UNSAFE_PATTERNS.clone(),
        }
    }
}

impl SecurityRule for UnsafeContentRule {
    fn name(&self) -> &str {
        "unsafe_content"
    }

    fn evaluate(&self, request: &ScreenRequest<'_>) -> ScreenVerdict {
        match self
            .patterns
            .iter()
            .find(|p| p.is_match(request.serialized_args))
        {
            Some(p) => ScreenVerdict::Deny(format!("arguments match blocked pattern {}", p.as_str())),
            None => ScreenVerdict::Allow,
        }
    }
}

/// Rejects calls without a real session.
struct RequireSessionRule;

impl SecurityRule for RequireSessionRule {
    fn name(&self) -> &str {
        "require_session"
    }

    fn evaluate(&self, request: &ScreenRequest<'_>) -> ScreenVerdict {
        let session = request.context.session_id.trim();
        if session.is_empty() || session == "anonymous" {
            ScreenVerdict::Deny("an authenticated session is required".into())
        } else {
            ScreenVerdict::Allow
        }
    }
}

// ── Result sanitizing ──────────────────────────────────────────

static SANITIZE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<script\b[^>]*>.*?</script\s*>",
        r"(?i)javascript:\S*",
        r"(?i)\bon\w+\s*=",
        r"(?is)alert\(.*?\)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid sanitize pattern"))
    .collect()
});

/// Strip script blocks, `javascript:` URIs, inline handlers, and `alert(...)` calls.
pub fn sanitize_text(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in SANITIZE_PATTERNS.iter() {
        if pattern.is_match(&out) {
            out = pattern.replace_all(&out, "").into_owned();
        }
    }
    out
}

/// Recursively sanitize every string leaf.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_value(v)))
                .collect(),
        ),
        other => other,
    }
}
