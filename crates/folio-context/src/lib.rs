//! # folio-context
//!
//! Infers where the user is on the site and which tools matter there.
//!
//! - [`PageContextDetector`] classifies URLs, chat messages, navigation
//!   history and referrers into a page/section guess with a confidence score,
//!   and keeps a short log of context changes.
//! - [`SuggestionEngine`] ranks tool names by relevance to a context and to
//!   free text. It never executes anything.
//! - [`help`] holds the canned per-page guidance shown to users.

pub mod detector;
pub mod help;
pub mod suggestions;

pub use detector::{
    ContextTrackingEntry, ContextValidation, DetectionSource, DetectionSources, PageContextDetection,
    PageContextDetector,
};
pub use help::{ContextualHelp, contextual_help, contextual_help_for};
pub use suggestions::{DetectedIntent, Intent, Priority, SuggestionEngine, ToolSuggestion};
