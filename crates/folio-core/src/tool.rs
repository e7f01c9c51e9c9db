use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::ToolResult;
use crate::schema::ParamSchema;
use crate::types::ToolContext;

/// Function-call descriptor handed to the external orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name, e.g. "navigate_to_page", "download_resume".
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: String,
    /// JSON Schema of the parameters object.
    pub parameters: Value,
}

/// One entry in the registry's execution history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    pub result: ToolResult,
    pub timestamp: DateTime<Utc>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value, result: ToolResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
            result,
            timestamp: Utc::now(),
        }
    }
}

/// Per-call execution knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Check arguments against the tool's schema before running.
    pub validate_args: bool,
    /// Wall-clock limit for the tool body.
    pub timeout_ms: u64,
    /// Retry failed or timed-out executions.
    pub retry: bool,
    /// Remaining retries when `retry` is set.
    pub retry_attempts: u32,
    /// Fixed delay between retries.
    pub retry_delay_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            validate_args: true,
            timeout_ms: 10_000,
            retry: false,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
        }
    }
}

/// A named, schema-described capability the registry can dispatch to.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &ParamSchema;

    /// Run the capability. `Err` means the body failed unexpectedly; expected
    /// failures come back as [`ToolResult::Failure`].
    async fn execute(
        &self,
        args: &Value,
        context: &ToolContext,
        config: &ExecutionConfig,
    ) -> crate::Result<ToolResult>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().to_json_schema(),
        }
    }

    /// Execution statistics, for tools that keep them.
    fn stats(&self) -> Option<ToolStats> {
        None
    }
}

/// Aggregated execution statistics for a single tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolStats {
    pub executions: usize,
    pub successes: usize,
    pub failures: usize,
    pub average_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_code: Option<crate::ErrorCode>,
}
