//! # folio-cli
//!
//! Command-line interface for the Folio tool framework.
//!
//! ## Commands
//!
//! - `folio tools`: List registered tools and their parameters
//! - `folio exec`: Run one tool through the middleware
//! - `folio chain`: Run a JSON file of tool calls in order
//! - `folio detect`: Detect the page context from a URL, message, or history
//! - `folio suggest`: Rank tools for a context
//! - `folio guide`: Show per-page help
//! - `folio config`: Show the effective configuration

pub mod commands;

pub use commands::Cli;
