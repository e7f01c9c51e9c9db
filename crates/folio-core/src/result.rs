use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ToolAction;

/// Machine-readable failure codes returned in [`ToolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ── Framework ──────────────────────────────────────────────
    ToolNotFound,
    RateLimitExceeded,
    SecurityViolation,
    InvalidArguments,
    InvalidContext,
    ExecutionTimeout,
    ExecutionError,
    UnknownError,
    // ── Tool-specific ──────────────────────────────────────────
    InvalidTheme,
    UnsupportedFile,
    InvalidAction,
    InvalidSection,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ToolNotFound => "TOOL_NOT_FOUND",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::SecurityViolation => "SECURITY_VIOLATION",
            ErrorCode::InvalidArguments => "INVALID_ARGUMENTS",
            ErrorCode::InvalidContext => "INVALID_CONTEXT",
            ErrorCode::ExecutionTimeout => "EXECUTION_TIMEOUT",
            ErrorCode::ExecutionError => "EXECUTION_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
            ErrorCode::InvalidTheme => "INVALID_THEME",
            ErrorCode::UnsupportedFile => "UNSUPPORTED_FILE",
            ErrorCode::InvalidAction => "INVALID_ACTION",
            ErrorCode::InvalidSection => "INVALID_SECTION",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure, rendered by the UI as a message plus actionable hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Value>,
}

impl ToolError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            fallback: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }

    pub fn with_fallback(mut self, fallback: Value) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

/// Stamped onto successful results by the execution middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub executed_at: DateTime<Utc>,
    pub tool_name: String,
    pub processed_by: String,
}

/// Outcome of a tool execution: either data plus UI actions, or a structured error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResult {
    Success {
        data: Value,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        actions: Vec<ToolAction>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<ResultMetadata>,
    },
    Failure { error: ToolError },
}

impl ToolResult {
    pub fn success(data: Value) -> Self {
        ToolResult::Success {
            data,
            actions: Vec::new(),
            metadata: None,
        }
    }

    pub fn with_action(mut self, action: ToolAction) -> Self {
        if let ToolResult::Success { actions, .. } = &mut self {
            actions.push(action);
        }
        self
    }

    pub fn failure(error: ToolError) -> Self {
        ToolResult::Failure { error }
    }

    /// Shorthand for a failure with a code, message, and hints.
    pub fn error<I, S>(code: ErrorCode, message: impl Into<String>, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ToolResult::Failure {
            error: ToolError::new(code, message).with_suggestions(suggestions),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ToolResult::Success { data, .. } => Some(data),
            ToolResult::Failure { .. } => None,
        }
    }

    pub fn actions(&self) -> &[ToolAction] {
        match self {
            ToolResult::Success { actions, .. } => actions,
            ToolResult::Failure { .. } => &[],
        }
    }

    pub fn metadata(&self) -> Option<&ResultMetadata> {
        match self {
            ToolResult::Success { metadata, .. } => metadata.as_ref(),
            ToolResult::Failure { .. } => None,
        }
    }

    pub fn error_detail(&self) -> Option<&ToolError> {
        match self {
            ToolResult::Failure { error } => Some(error),
            ToolResult::Success { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error_detail().map(|e| e.code)
    }
}
