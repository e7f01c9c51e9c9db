use folio_core::{ExecutionConfig, ValidationOptions};
use serde::{Deserialize, Serialize};

/// Root configuration, maps to `folio.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub rate_limit: RateLimitConfig,
    pub security: SecurityConfig,
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
    pub execution: ExecutionDefaults,
}

// ── Rate limiting ──────────────────────────────────────────────

/// How the rate limiter derives its bucket key from a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitKey {
    /// `session_id` + `user_agent`.
    #[default]
    SessionAndAgent,
    /// `session_id` only.
    Session,
    /// One shared bucket for every caller.
    Global,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests admitted per window and key.
    pub max_requests: u32,
    /// Window length in milliseconds.
    pub window_ms: u64,
    pub key: RateLimitKey,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_ms: 60_000,
            key: RateLimitKey::SessionAndAgent,
        }
    }
}

// ── Security ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum serialized argument size in bytes.
    pub max_argument_size: usize,
    /// Extra regular expressions rejected in serialized arguments,
    /// on top of the built-in unsafe-content patterns.
    pub blocked_patterns: Vec<String>,
    /// Reject calls whose session is empty or `anonymous`.
    pub require_auth: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_argument_size: 10_000,
            blocked_patterns: vec![],
            require_auth: false,
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Strict typing: no string-to-number or string-to-boolean coercion.
    pub strict_mode: bool,
    /// Accept properties a tool's schema does not declare.
    pub allow_additional_properties: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_mode: true,
            allow_additional_properties: false,
        }
    }
}

impl ValidationConfig {
    pub fn options(&self) -> ValidationOptions {
        ValidationOptions {
            strict: self.strict_mode,
            allow_additional_properties: Some(self.allow_additional_properties),
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

/// Minimum severity for middleware execution logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<LogLevel> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit middleware execution logs at all.
    pub enabled: bool,
    /// Minimum severity for middleware logs.
    pub level: LogLevel,
    /// Output format for the CLI subscriber: "pretty", "json", "compact".
    pub format: String,
    pub log_successful_executions: bool,
    pub log_failed_executions: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LogLevel::Info,
            format: "pretty".into(),
            log_successful_executions: true,
            log_failed_executions: true,
        }
    }
}

// ── Execution ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionDefaults {
    pub timeout_ms: u64,
    pub retry: bool,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    /// Execution history entries kept by the registry.
    pub history_limit: usize,
}

impl Default for ExecutionDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry: false,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
            history_limit: 1_000,
        }
    }
}

impl ExecutionDefaults {
    /// The per-call config used when a caller passes none.
    pub fn to_execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            validate_args: true,
            timeout_ms: self.timeout_ms,
            retry: self.retry,
            retry_attempts: self.retry_attempts,
            retry_delay_ms: self.retry_delay_ms,
        }
    }
}

// ── Validation warnings ────────────────────────────────────────

/// A configuration validation warning or error.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Error => "❌",
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl FolioConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Rate limit ───
        if self.rate_limit.max_requests == 0 {
            warnings.push(ConfigWarning {
                field: "rate_limit.max_requests".into(),
                message: "max_requests is 0, so every tool call will be rejected".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 100".into()),
            });
        }
        if self.rate_limit.window_ms == 0 {
            warnings.push(ConfigWarning {
                field: "rate_limit.window_ms".into(),
                message: "window_ms is 0, so rate limiting is effectively disabled".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to e.g. 60000 (one minute)".into()),
            });
        }
        if self.rate_limit.key == RateLimitKey::Global {
            warnings.push(ConfigWarning {
                field: "rate_limit.key".into(),
                message: "a global key makes every session share one budget".into(),
                severity: WarningSeverity::Info,
                hint: Some("Use 'session_and_agent' to limit callers independently".into()),
            });
        }

        // ── Security ───
        if self.security.max_argument_size == 0 {
            warnings.push(ConfigWarning {
                field: "security.max_argument_size".into(),
                message: "max_argument_size is 0, so every call with arguments will be rejected".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 10000".into()),
            });
        }
        for pattern in &self.security.blocked_patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                warnings.push(ConfigWarning {
                    field: "security.blocked_patterns".into(),
                    message: format!("pattern '{}' does not compile: {}", pattern, e),
                    severity: WarningSeverity::Error,
                    hint: Some("Patterns use Rust regex syntax".into()),
                });
            }
        }

        // ── Validation ───
        if !self.validation.strict_mode {
            warnings.push(ConfigWarning {
                field: "validation.strict_mode".into(),
                message: "strict mode is off, so numeric and boolean strings will be coerced".into(),
                severity: WarningSeverity::Info,
                hint: None,
            });
        }

        // ── Execution ───
        if self.execution.timeout_ms == 0 {
            warnings.push(ConfigWarning {
                field: "execution.timeout_ms".into(),
                message: "timeout_ms is 0, so every tool call will time out".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 10000".into()),
            });
        }
        if self.execution.history_limit == 0 {
            warnings.push(ConfigWarning {
                field: "execution.history_limit".into(),
                message: "history_limit is 0, so no execution history will be kept".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to e.g. 1000".into()),
            });
        }

        // ── Logging ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
