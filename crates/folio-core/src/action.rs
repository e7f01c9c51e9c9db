use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FolioError, Result};
use crate::types::{Page, Theme};

/// A side effect the UI collaborator must perform after a successful tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolAction {
    /// Route to a page path, optionally landing on a section.
    Navigate {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        section: Option<String>,
    },
    /// Fetch a file for the user.
    Download { target: String, filename: String },
    /// Switch the color scheme.
    Theme { target: Theme },
    /// Open a dialog by id.
    Modal {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    /// Scroll the current page to a section anchor.
    Scroll { target: String },
}

/// Discriminant of [`ToolAction`], handy for policy tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Navigate,
    Download,
    Theme,
    Modal,
    Scroll,
}

impl ToolAction {
    pub fn navigate(page: Page, section: Option<&str>) -> Self {
        let target = match page {
            Page::Home => "/".to_string(),
            p => format!("/{}", p.as_str()),
        };
        ToolAction::Navigate {
            target,
            section: section.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    pub fn download(target: impl Into<String>, filename: impl Into<String>) -> Result<Self> {
        let target = target.into();
        let filename = filename.into();
        if target.trim().is_empty() {
            return Err(invalid("download", "target url is empty"));
        }
        if filename.trim().is_empty() || filename.contains('/') || filename.contains('\\') {
            return Err(invalid("download", "filename must be a bare file name"));
        }
        Ok(ToolAction::Download { target, filename })
    }

    pub fn theme(theme: Theme) -> Self {
        ToolAction::Theme { target: theme }
    }

    pub fn modal(target: impl Into<String>, data: Option<Value>) -> Result<Self> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(invalid("modal", "modal id is empty"));
        }
        Ok(ToolAction::Modal { target, data })
    }

    pub fn scroll(section: impl Into<String>) -> Result<Self> {
        let target = section.into();
        if target.trim().is_empty() {
            return Err(invalid("scroll", "section anchor is empty"));
        }
        Ok(ToolAction::Scroll { target })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ToolAction::Navigate { .. } => ActionKind::Navigate,
            ToolAction::Download { .. } => ActionKind::Download,
            ToolAction::Theme { .. } => ActionKind::Theme,
            ToolAction::Modal { .. } => ActionKind::Modal,
            ToolAction::Scroll { .. } => ActionKind::Scroll,
        }
    }

    pub fn target(&self) -> String {
        match self {
            ToolAction::Navigate { target, .. }
            | ToolAction::Download { target, .. }
            | ToolAction::Modal { target, .. }
            | ToolAction::Scroll { target } => target.clone(),
            ToolAction::Theme { target } => target.as_str().to_string(),
        }
    }
}

fn invalid(kind: &str, reason: &str) -> FolioError {
    FolioError::InvalidAction {
        kind: kind.into(),
        reason: reason.into(),
    }
}

/// Decides whether the UI should ask before performing an action.
///
/// The framework never calls this itself; it is a hook for the action-execution
/// boundary in the hosting application.
pub trait ActionPolicy: Send + Sync {
    fn requires_confirmation(&self, action: &ToolAction) -> bool;
}

/// Asks before downloads and theme switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmDestructive;

impl ActionPolicy for ConfirmDestructive {
    fn requires_confirmation(&self, action: &ToolAction) -> bool {
        matches!(action.kind(), ActionKind::Download | ActionKind::Theme)
    }
}
