//! # folio-core
//!
//! Core types, traits, and primitives for the Folio contextual tool framework.
//! This crate defines the shared vocabulary used by every other crate in the workspace:
//! the execution context handed to tools, the parameter schema language, the tool
//! trait, and the structured results and actions tools hand back to the UI.

pub mod action;
pub mod context;
pub mod error;
pub mod result;
pub mod schema;
pub mod tool;
pub mod types;

pub use action::{ActionKind, ActionPolicy, ConfirmDestructive, ToolAction};
pub use context::{ContextSanitizer, ContextTransformer, ContextUpdate, ContextValidator};
pub use error::{FolioError, Result};
pub use result::{ErrorCode, ResultMetadata, ToolError, ToolResult};
pub use schema::{ParamSchema, Property, ValidationError, ValidationErrorKind, ValidationOptions, ValidationReport, Validator};
pub use tool::{ExecutionConfig, Tool, ToolCall, ToolDefinition, ToolStats};
pub use types::*;
