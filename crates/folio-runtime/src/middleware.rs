//! The execution pipeline every registry dispatch goes through.
//!
//! Gates run in order and the first rejection short-circuits:
//! rate limit, security screen, argument contract, execution, then
//! sanitizing and stamping of successful results.

use std::sync::Arc;

use chrono::Utc;
use folio_config::{FolioConfig, LogLevel, LoggingConfig, RateLimitKey};
use folio_core::{
    ErrorCode, ExecutionConfig, Result, ResultMetadata, Tool, ToolContext, ToolResult, Validator,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::ratelimit::{RateLimiter, WindowConfig};
use crate::security::{ScreenVerdict, SecurityScreen, sanitize_value};

/// Stamped into [`ResultMetadata::processed_by`].
pub const PROCESSED_BY: &str = "folio-middleware";

/// Derives a rate-limit key from a context.
pub type KeyGenerator = Arc<dyn Fn(&ToolContext) -> String + Send + Sync>;

pub struct ExecutionMiddleware {
    limiter: RateLimiter,
    key: RateLimitKey,
    key_generator: Option<KeyGenerator>,
    screen: SecurityScreen,
    validator: Validator,
    logging: LoggingConfig,
}

impl Default for ExecutionMiddleware {
    fn default() -> Self {
        let config = FolioConfig::default();
        Self {
            limiter: RateLimiter::new(WindowConfig::from(&config.rate_limit)),
            key: config.rate_limit.key,
            key_generator: None,
            screen: SecurityScreen::new(),
            validator: Validator::new(config.validation.options()),
            logging: config.logging,
        }
    }
}

impl ExecutionMiddleware {
    /// Fails only when a configured blocked pattern does not compile.
    pub fn new(config: &FolioConfig) -> Result<Self> {
        Ok(Self {
            limiter: RateLimiter::new(WindowConfig::from(&config.rate_limit)),
            key: config.rate_limit.key,
            key_generator: None,
            screen: SecurityScreen::from_config(&config.security)?,
            validator: Validator::new(config.validation.options()),
            logging: config.logging.clone(),
        })
    }

    /// Replace the configured key strategy with a custom one.
    pub fn with_key_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&ToolContext) -> String + Send + Sync + 'static,
    {
        self.key_generator = Some(Arc::new(generator));
        self
    }

    pub fn with_screen(mut self, screen: SecurityScreen) -> Self {
        self.screen = screen;
        self
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn rate_limit_key(&self, context: &ToolContext) -> String {
        if let Some(generator) = &self.key_generator {
            return generator(context);
        }
        match self.key {
            RateLimitKey::SessionAndAgent => format!("{}:{}", context.session_id, context.user_agent),
            RateLimitKey::Session => context.session_id.clone(),
            RateLimitKey::Global => "global".to_string(),
        }
    }

    /// Run `tool` through every gate. Never fails; rejections come back as
    /// [`ToolResult::Failure`].
    pub async fn execute(
        &self,
        tool: &dyn Tool,
        args: &Value,
        context: &ToolContext,
        config: &ExecutionConfig,
    ) -> ToolResult {
        let name = tool.name();

        // ── Rate limit ───
        let key = self.rate_limit_key(context);
        if let Err(retry_after) = self.limiter.check(&key) {
            self.log_failure(LogLevel::Warn, name, ErrorCode::RateLimitExceeded, "rate limited");
            return ToolResult::error(
                ErrorCode::RateLimitExceeded,
                format!("Rate limit exceeded for {name}"),
                [format!("Try again in {retry_after} seconds")],
            );
        }

        // ── Security ───
        if let ScreenVerdict::Deny(reason) = self.screen.evaluate(name, args, context) {
            self.log_failure(LogLevel::Warn, name, ErrorCode::SecurityViolation, &reason);
            return ToolResult::error(
                ErrorCode::SecurityViolation,
                format!("Security check failed: {reason}"),
                ["Remove scripts, URIs, or event handlers from the arguments"],
            );
        }

        // ── Contract ───
        let report = self.validator.validate(tool.parameters(), args);
        if !report.valid {
            self.log_failure(LogLevel::Info, name, ErrorCode::InvalidArguments, &report.summary());
            return ToolResult::error(
                ErrorCode::InvalidArguments,
                format!("Invalid arguments for {name}"),
                report.suggestions(),
            );
        }

        // ── Execute ───
        let result = match tool.execute(args, context, config).await {
            Ok(result) => result,
            Err(e) => {
                let reason = e.to_string();
                self.log_failure(LogLevel::Error, name, ErrorCode::ExecutionError, &reason);
                return ToolResult::error(ErrorCode::ExecutionError, reason, ["Try again in a moment"]);
            }
        };

        // ── Post-process ───
        match result {
            ToolResult::Success { data, actions, .. } => {
                self.log_success(name);
                ToolResult::Success {
                    data: sanitize_value(data),
                    actions,
                    metadata: Some(ResultMetadata {
                        executed_at: Utc::now(),
                        tool_name: name.to_string(),
                        processed_by: PROCESSED_BY.to_string(),
                    }),
                }
            }
            failure @ ToolResult::Failure { .. } => {
                if let Some(code) = failure.error_code() {
                    self.log_failure(LogLevel::Warn, name, code, "tool returned a failure");
                }
                failure
            }
        }
    }

    // ── Logging ────────────────────────────────────────────────

    fn should_log(&self, level: LogLevel) -> bool {
        self.logging.enabled && level >= self.logging.level
    }

    fn log_success(&self, tool: &str) {
        if self.logging.log_successful_executions && self.should_log(LogLevel::Info) {
            info!(tool, "tool executed");
        }
    }

    fn log_failure(&self, level: LogLevel, tool: &str, code: ErrorCode, detail: &str) {
        if !self.logging.log_failed_executions || !self.should_log(level) {
            return;
        }
        let code = code.as_str();
        match level {
            LogLevel::Debug => debug!(tool, code, detail, "tool call rejected"),
            LogLevel::Info => info!(tool, code, detail, "tool call rejected"),
            LogLevel::Warn => warn!(tool, code, detail, "tool call rejected"),
            LogLevel::Error => error!(tool, code, detail, "tool call failed"),
        }
    }
}
