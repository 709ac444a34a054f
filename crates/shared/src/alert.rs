//! User-visible status messages raised by the exchange flows.

use serde::{Deserialize, Serialize};

/// Text shown for every transport failure, whichever flow triggered it.
pub const INTERNAL_ERROR_TEXT: &str = "An internal error occurred. Try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Success,
    Warning,
    Error,
}

/// A single status message. Fields are private so an alert cannot change
/// after it has been raised; a new alert replaces it instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    kind: AlertKind,
    text: String,
}

impl Alert {
    pub fn new(kind: AlertKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(AlertKind::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(AlertKind::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(AlertKind::Error, text)
    }

    pub fn internal_error() -> Self {
        Self::error(INTERNAL_ERROR_TEXT)
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
