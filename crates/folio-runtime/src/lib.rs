//! # folio-runtime
//!
//! Executes tools on behalf of an external orchestrator.
//!
//! ## Architecture
//!
//! ```text
//!   execute_tool(name, args, context)
//!              │
//!              ▼
//!      ┌──────────────┐
//!      │ ToolRegistry │  ← name lookup, history, chains
//!      └──────┬───────┘
//!             ▼
//!      ┌──────────────────────┐
//!      │ ExecutionMiddleware  │
//!      │  1. Rate limit       │
//!      │  2. Security screen  │
//!      │  3. Contract check   │
//!      │  4. Execute          │
//!      │  5. Sanitize/stamp   │
//!      └──────┬───────────────┘
//!             ▼
//!      ┌──────────────┐
//!      │   BaseTool   │  ← timeout, retry, per-tool stats
//!      └──────┬───────┘
//!             ▼
//!        ToolHandler
//! ```

pub mod base;
pub mod builtin;
pub mod middleware;
pub mod ratelimit;
pub mod registry;
pub mod security;

pub use base::{BaseTool, ExecutionRecord, ToolHandler};
pub use middleware::{ExecutionMiddleware, KeyGenerator, PROCESSED_BY};
pub use ratelimit::{RateLimiter, WindowConfig};
pub use registry::{ChainStep, RegistryStats, ToolRegistry};
pub use security::{ScreenVerdict, SecurityRule, SecurityScreen, sanitize_text, sanitize_value};
