use thiserror::Error;

/// Unified error type for the Folio framework.
///
/// Tool invocations never surface these to callers of the registry; they are
/// converted into structured [`crate::ToolResult`] failures at the boundary.
#[derive(Error, Debug)]
pub enum FolioError {
    // ── Registry errors ────────────────────────────────────────
    #[error("tool already registered: {0}")]
    DuplicateTool(String),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    // ── Execution errors ───────────────────────────────────────
    #[error("tool execution failed: {tool}: {reason}")]
    ToolExecution { tool: String, reason: String },

    #[error("tool timed out: {tool} after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },

    // ── Action errors ──────────────────────────────────────────
    #[error("invalid action: {kind}: {reason}")]
    InvalidAction { kind: String, reason: String },

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl FolioError {
    /// Shorthand for a handler failure attributed to a tool.
    pub fn execution(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        FolioError::ToolExecution {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
