use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body the service uses to reject a request. The `error` key is the only
/// part the client relies on; other keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The rejection message, if the body carries a non-empty one.
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }
}

/// A rejection authored by the remote service. Its text is meant to be shown
/// to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApplicationError {
    pub message: String,
}

impl ApplicationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
