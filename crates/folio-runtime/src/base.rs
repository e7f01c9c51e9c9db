//! The per-tool execution envelope.
//!
//! [`BaseTool`] wraps a [`ToolHandler`] with argument and context checks, a
//! timeout race, opt-in fixed-delay retries, and a bounded log of execution
//! records used for [`Tool::stats`].

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{
    ContextValidator, ErrorCode, ExecutionConfig, FolioError, ParamSchema, Result, Tool, ToolContext, ToolResult,
    ToolStats, ValidationOptions, Validator,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Execution records kept per tool.
pub const RECORD_CAPACITY: usize = 100;

/// The capability body of a tool.
///
/// Return `Ok(ToolResult::Failure { .. })` for expected, tool-specific
/// failures; `Err` is for unexpected ones and may be retried.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> ParamSchema;
    async fn run(&self, args: &Value, context: &ToolContext) -> Result<ToolResult>;
}

/// One execution of a tool, for statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub tool_name: String,
    pub execution_time_ms: u64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

pub struct BaseTool<H> {
    handler: H,
    schema: ParamSchema,
    validator: Validator,
    records: Mutex<VecDeque<ExecutionRecord>>,
}

impl<H: ToolHandler> BaseTool<H> {
    pub fn new(handler: H) -> Self {
        let schema = handler.parameters();
        Self {
            handler,
            schema,
            validator: Validator::default(),
            records: Mutex::new(VecDeque::with_capacity(RECORD_CAPACITY)),
        }
    }

    /// Use these validation options instead of strict defaults.
    pub fn with_validation(mut self, options: ValidationOptions) -> Self {
        self.validator = Validator::new(options);
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Oldest first.
    pub fn records(&self) -> Vec<ExecutionRecord> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn clear_records(&self) {
        self.records.lock().clear();
    }

    async fn run_guarded(&self, args: &Value, context: &ToolContext, config: &ExecutionConfig) -> ToolResult {
        let name = self.handler.name();

        if config.validate_args {
            let report = self.validator.validate(&self.schema, args);
            if !report.valid {
                debug!(tool = name, errors = %report.summary(), "argument validation failed");
                return ToolResult::error(
                    ErrorCode::InvalidArguments,
                    format!("Invalid arguments for {name}: {}", report.summary()),
                    ["Check the tool parameters and try again"],
                );
            }
        }

        let problems = ContextValidator::validate_envelope(context);
        if !problems.is_empty() {
            return ToolResult::error(
                ErrorCode::InvalidContext,
                format!("Invalid context: {}", problems.join("; ")),
                ["Provide a non-empty session id"],
            );
        }

        let mut remaining = if config.retry { config.retry_attempts } else { 0 };
        loop {
            let limit = Duration::from_millis(config.timeout_ms);
            let err = match tokio::time::timeout(limit, self.handler.run(args, context)).await {
                Ok(Ok(result)) => return result,
                Ok(Err(e)) => e,
                Err(_) => FolioError::Timeout {
                    tool: name.to_string(),
                    timeout_ms: config.timeout_ms,
                },
            };

            if remaining == 0 {
                return failure_for(err);
            }
            remaining -= 1;
            warn!(
                tool = name,
                error = %err,
                retries_left = remaining,
                delay_ms = config.retry_delay_ms,
                "tool execution failed, retrying"
            );
            tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
        }
    }

    fn record(&self, result: &ToolResult, elapsed: Duration) {
        let mut records = self.records.lock();
        if records.len() >= RECORD_CAPACITY {
            records.pop_front();
        }
        records.push_back(ExecutionRecord {
            tool_name: self.handler.name().to_string(),
            execution_time_ms: elapsed.as_millis() as u64,
            success: result.is_success(),
            timestamp: Utc::now(),
            error_code: result.error_code(),
        });
    }
}

/// Map an unexpected handler error onto a structured failure.
fn failure_for(err: FolioError) -> ToolResult {
    match err {
        FolioError::Timeout { timeout_ms, .. } => ToolResult::error(
            ErrorCode::ExecutionTimeout,
            format!("Tool execution timed out after {timeout_ms}ms"),
            ["Try again, or raise the timeout"],
        ),
        FolioError::ToolExecution { reason, .. } => ToolResult::error(
            ErrorCode::ExecutionError,
            reason,
            ["Try again in a moment"],
        ),
        other => ToolResult::error(ErrorCode::UnknownError, other.to_string(), ["Try again in a moment"]),
    }
}

#[async_trait]
impl<H: ToolHandler> Tool for BaseTool<H> {
    fn name(&self) -> &str {
        self.handler.name()
    }

    fn description(&self) -> &str {
        self.handler.description()
    }

    fn parameters(&self) -> &ParamSchema {
        &self.schema
    }

    async fn execute(&self, args: &Value, context: &ToolContext, config: &ExecutionConfig) -> Result<ToolResult> {
        let started = Instant::now();
        let result = self.run_guarded(args, context, config).await;
        self.record(&result, started.elapsed());
        Ok(result)
    }

    fn stats(&self) -> Option<ToolStats> {
        let records = self.records.lock();
        let executions = records.len();
        let successes = records.iter().filter(|r| r.success).count();
        let total_ms: u64 = records.iter().map(|r| r.execution_time_ms).sum();
        Some(ToolStats {
            executions,
            successes,
            failures: executions - successes,
            average_time_ms: if executions == 0 {
                0.0
            } else {
                total_ms as f64 / executions as f64
            },
            last_error_code: records.iter().rev().find_map(|r| r.error_code),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Page;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times, then succeeds.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ToolHandler for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn description(&self) -> &str {
            "Fails a few times"
        }

        fn parameters(&self) -> ParamSchema {
            ParamSchema::object()
        }

        async fn run(&self, _args: &Value, _context: &ToolContext) -> Result<ToolResult> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(FolioError::execution("flaky", "not yet"))
            } else {
                Ok(ToolResult::success(json!({"attempt": n + 1})))
            }
        }
    }

    fn flaky(failures: u32) -> BaseTool<Flaky> {
        BaseTool::new(Flaky {
            failures,
            calls: AtomicU32::new(0),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers() {
        let tool = flaky(2);
        let config = ExecutionConfig {
            retry: true,
            retry_attempts: 3,
            retry_delay_ms: 100,
            ..Default::default()
        };
        let ctx = ToolContext::new(Page::Home, "s1");
        let result = tool.execute(&json!({}), &ctx, &config).await.unwrap();
        assert_eq!(result.data(), Some(&json!({"attempt": 3})));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted() {
        let tool = flaky(10);
        let config = ExecutionConfig {
            retry: true,
            retry_attempts: 2,
            retry_delay_ms: 10,
            ..Default::default()
        };
        let ctx = ToolContext::new(Page::Home, "s1");
        let result = tool.execute(&json!({}), &ctx, &config).await.unwrap();
        assert_eq!(result.error_code(), Some(ErrorCode::ExecutionError));
        assert_eq!(tool.handler().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let tool = flaky(1);
        let ctx = ToolContext::new(Page::Home, "s1");
        let result = tool.execute(&json!({}), &ctx, &ExecutionConfig::default()).await.unwrap();
        assert_eq!(result.error_code(), Some(ErrorCode::ExecutionError));
        assert_eq!(tool.handler().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_mapping() {
        let unknown = failure_for(FolioError::Config("x".into()));
        assert_eq!(unknown.error_code(), Some(ErrorCode::UnknownError));
        let timeout = failure_for(FolioError::Timeout {
            tool: "t".into(),
            timeout_ms: 5,
        });
        assert_eq!(timeout.error_code(), Some(ErrorCode::ExecutionTimeout));
    }
}
