//! # folio-config
//!
//! Configuration system for the Folio tool framework. Reads from `folio.toml` and
//! environment variables, in that precedence order, and validates the result.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::FolioConfig;
pub use schema::{
    ConfigWarning, ExecutionDefaults, LogLevel, LoggingConfig, RateLimitConfig, RateLimitKey,
    SecurityConfig, ValidationConfig, WarningSeverity,
};
