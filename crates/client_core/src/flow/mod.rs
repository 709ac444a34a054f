//! Consent flows: request a prompt, let the user decide, finalize.
//!
//! Controllers never perform I/O themselves. A `begin_*` method moves the
//! flow into a waiting stage and hands back the [`ExchangeRequest`] to run;
//! the caller executes it (on whatever runtime it owns) and feeds the
//! [`ExchangeReply`] back through `apply`. Loading and alert changes are
//! emitted into a [`FlowSink`] supplied by the caller.

use std::fmt;

use shared::{
    alert::Alert,
    domain::{ExchangeKind, FieldForm, IssuePrompt, VerifyPrompt},
    protocol::FinalizeAck,
};
use thiserror::Error;
use tracing::debug;

use crate::exchange::{ExchangeError, ExchangeService, TransportError};

pub mod issue;
pub mod verify;

pub use issue::{IssueFlow, IssueState};
pub use verify::{VerifyFlow, VerifyState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Idle,
    AwaitingPrompt,
    PromptReady,
    CollectingFields,
    Submitting,
}

impl FlowStage {
    /// True while a request is in flight and user intents must wait.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::AwaitingPrompt | Self::Submitting)
    }
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingPrompt => "awaiting a prompt",
            Self::PromptReady => "showing a prompt",
            Self::CollectingFields => "collecting fields",
            Self::Submitting => "submitting",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    LoadingChanged(bool),
    AlertRaised(Alert),
    AlertCleared,
}

/// Receives the state changes a controller wants the presentation to show.
pub trait FlowSink {
    fn emit(&mut self, event: FlowEvent);
}

impl FlowSink for Vec<FlowEvent> {
    fn emit(&mut self, event: FlowEvent) {
        self.push(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("{intent} is not accepted while the {kind} flow is {stage}")]
    InvalidIntent {
        kind: ExchangeKind,
        intent: &'static str,
        stage: FlowStage,
    },
    #[error("an endpoint is required before submitting")]
    MissingEndpoint,
    #[error("the form has no field named {0:?}")]
    UnknownField(String),
    #[error("a {reply} reply cannot settle the {kind} flow")]
    MismatchedReply {
        kind: ExchangeKind,
        reply: &'static str,
    },
}

/// A network call a controller is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeRequest {
    InitiateVerify { endpoint: String },
    FinalizeVerify { endpoint: String },
    InitiateIssue { endpoint: String },
    FinalizeIssue { endpoint: String, fields: FieldForm },
}

impl ExchangeRequest {
    pub fn kind(&self) -> ExchangeKind {
        match self {
            Self::InitiateVerify { .. } | Self::FinalizeVerify { .. } => ExchangeKind::Verify,
            Self::InitiateIssue { .. } | Self::FinalizeIssue { .. } => ExchangeKind::Issue,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitiateVerify { .. } => "initiate_verify",
            Self::FinalizeVerify { .. } => "finalize_verify",
            Self::InitiateIssue { .. } => "initiate_issue",
            Self::FinalizeIssue { .. } => "finalize_issue",
        }
    }

    /// Runs the call against a service and wraps the result for `apply`.
    pub async fn execute<S>(self, service: &S) -> ExchangeReply
    where
        S: ExchangeService + ?Sized,
    {
        match self {
            Self::InitiateVerify { endpoint } => {
                ExchangeReply::VerifyPrompt(service.initiate_verify(&endpoint).await)
            }
            Self::FinalizeVerify { endpoint } => {
                ExchangeReply::VerifyFinalized(service.finalize_verify(&endpoint).await)
            }
            Self::InitiateIssue { endpoint } => {
                ExchangeReply::IssuePrompt(service.initiate_issue(&endpoint).await)
            }
            Self::FinalizeIssue { endpoint, fields } => {
                ExchangeReply::IssueFinalized(service.finalize_issue(&endpoint, &fields).await)
            }
        }
    }

    /// Settles the request without running it, as a transport failure. Used
    /// when the request could not be handed to the backend at all.
    pub fn fail(self, reason: impl Into<String>) -> ExchangeReply {
        let err = ExchangeError::from(TransportError::BackendUnavailable(reason.into()));
        match self {
            Self::InitiateVerify { .. } => ExchangeReply::VerifyPrompt(Err(err)),
            Self::FinalizeVerify { .. } => ExchangeReply::VerifyFinalized(Err(err)),
            Self::InitiateIssue { .. } => ExchangeReply::IssuePrompt(Err(err)),
            Self::FinalizeIssue { .. } => ExchangeReply::IssueFinalized(Err(err)),
        }
    }
}

/// Outcome of an [`ExchangeRequest`].
#[derive(Debug)]
pub enum ExchangeReply {
    VerifyPrompt(Result<VerifyPrompt, ExchangeError>),
    VerifyFinalized(Result<FinalizeAck, ExchangeError>),
    IssuePrompt(Result<IssuePrompt, ExchangeError>),
    IssueFinalized(Result<FinalizeAck, ExchangeError>),
}

impl ExchangeReply {
    pub fn kind(&self) -> ExchangeKind {
        match self {
            Self::VerifyPrompt(_) | Self::VerifyFinalized(_) => ExchangeKind::Verify,
            Self::IssuePrompt(_) | Self::IssueFinalized(_) => ExchangeKind::Issue,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::VerifyPrompt(_) => "verify prompt",
            Self::VerifyFinalized(_) => "verify finalize",
            Self::IssuePrompt(_) => "issue prompt",
            Self::IssueFinalized(_) => "issue finalize",
        }
    }
}

/// Common tail of every network step: loading off, then either the payload
/// or an error alert.
fn settle<T>(
    kind: ExchangeKind,
    step: &'static str,
    result: Result<T, ExchangeError>,
    sink: &mut dyn FlowSink,
) -> Option<T> {
    sink.emit(FlowEvent::LoadingChanged(false));
    match result {
        Ok(payload) => Some(payload),
        Err(err) => {
            debug!(%kind, step, application = err.is_application(), "exchange step failed");
            sink.emit(FlowEvent::AlertRaised(err.alert()));
            None
        }
    }
}

fn begin_request(sink: &mut dyn FlowSink) {
    sink.emit(FlowEvent::LoadingChanged(true));
}

#[cfg(test)]
#[path = "../tests/flow_tests.rs"]
mod tests;
