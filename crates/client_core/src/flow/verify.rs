use shared::{
    alert::Alert,
    domain::{is_submittable_endpoint, ExchangeKind, VerifyPrompt},
};
use tracing::debug;

use super::{begin_request, settle, ExchangeReply, ExchangeRequest, FlowError, FlowEvent, FlowSink, FlowStage};
use crate::exchange::ExchangeService;

pub const VERIFY_DENIED_TEXT: &str = "Verify request denied.";
pub const VERIFIED_TEXT: &str = "Verified!";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VerifyState {
    #[default]
    Idle,
    AwaitingPrompt,
    /// The prompt lives here and nowhere else; leaving this state drops it.
    PromptReady(VerifyPrompt),
    Submitting,
}

impl VerifyState {
    pub fn stage(&self) -> FlowStage {
        match self {
            Self::Idle => FlowStage::Idle,
            Self::AwaitingPrompt => FlowStage::AwaitingPrompt,
            Self::PromptReady(_) => FlowStage::PromptReady,
            Self::Submitting => FlowStage::Submitting,
        }
    }
}

/// Drives a presentation exchange: fetch the verifier's prompt, then present
/// the holder's credential or refuse.
#[derive(Debug, Clone, Default)]
pub struct VerifyFlow {
    endpoint: String,
    state: VerifyState,
}

impl VerifyFlow {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: VerifyState::Idle,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> &VerifyState {
        &self.state
    }

    pub fn stage(&self) -> FlowStage {
        self.state.stage()
    }

    pub fn prompt(&self) -> Option<&VerifyPrompt> {
        match &self.state {
            VerifyState::PromptReady(prompt) => Some(prompt),
            _ => None,
        }
    }

    /// The endpoint is only editable while no exchange is underway.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) -> Result<(), FlowError> {
        if !matches!(self.state, VerifyState::Idle) {
            return Err(self.reject("edit endpoint"));
        }
        self.endpoint = endpoint.into();
        Ok(())
    }

    pub fn begin_submit(&mut self, sink: &mut dyn FlowSink) -> Result<ExchangeRequest, FlowError> {
        if !matches!(self.state, VerifyState::Idle) {
            return Err(self.reject("submit"));
        }
        if !is_submittable_endpoint(&self.endpoint) {
            return Err(FlowError::MissingEndpoint);
        }

        sink.emit(FlowEvent::AlertCleared);
        begin_request(sink);
        self.state = VerifyState::AwaitingPrompt;
        debug!(endpoint = %self.endpoint, "verify prompt requested");
        Ok(ExchangeRequest::InitiateVerify {
            endpoint: self.endpoint.clone(),
        })
    }

    pub fn deny(&mut self, sink: &mut dyn FlowSink) -> Result<(), FlowError> {
        if !matches!(self.state, VerifyState::PromptReady(_)) {
            return Err(self.reject("deny"));
        }

        self.finish();
        sink.emit(FlowEvent::AlertRaised(Alert::warning(VERIFY_DENIED_TEXT)));
        Ok(())
    }

    pub fn begin_accept(&mut self, sink: &mut dyn FlowSink) -> Result<ExchangeRequest, FlowError> {
        if !matches!(self.state, VerifyState::PromptReady(_)) {
            return Err(self.reject("accept"));
        }

        begin_request(sink);
        self.state = VerifyState::Submitting;
        debug!(endpoint = %self.endpoint, "verify prompt accepted");
        Ok(ExchangeRequest::FinalizeVerify {
            endpoint: self.endpoint.clone(),
        })
    }

    /// Settles the request returned by the last `begin_*` call.
    pub fn apply(&mut self, reply: ExchangeReply, sink: &mut dyn FlowSink) -> Result<(), FlowError> {
        match reply {
            ExchangeReply::VerifyPrompt(result) => {
                if !matches!(self.state, VerifyState::AwaitingPrompt) {
                    return Err(self.reject("prompt reply"));
                }
                self.state = match settle(ExchangeKind::Verify, "initiate", result, sink) {
                    Some(prompt) => VerifyState::PromptReady(prompt),
                    None => VerifyState::Idle,
                };
                Ok(())
            }
            ExchangeReply::VerifyFinalized(result) => {
                if !matches!(self.state, VerifyState::Submitting) {
                    return Err(self.reject("finalize reply"));
                }
                self.finish();
                if settle(ExchangeKind::Verify, "finalize", result, sink).is_some() {
                    sink.emit(FlowEvent::AlertRaised(Alert::success(VERIFIED_TEXT)));
                }
                Ok(())
            }
            other => Err(FlowError::MismatchedReply {
                kind: ExchangeKind::Verify,
                reply: other.name(),
            }),
        }
    }

    pub async fn submit<S>(&mut self, service: &S, sink: &mut dyn FlowSink) -> Result<(), FlowError>
    where
        S: ExchangeService + ?Sized,
    {
        let request = self.begin_submit(sink)?;
        let reply = request.execute(service).await;
        self.apply(reply, sink)
    }

    pub async fn accept<S>(&mut self, service: &S, sink: &mut dyn FlowSink) -> Result<(), FlowError>
    where
        S: ExchangeService + ?Sized,
    {
        let request = self.begin_accept(sink)?;
        let reply = request.execute(service).await;
        self.apply(reply, sink)
    }

    /// Every exit after a prompt was shown forgets the endpoint.
    fn finish(&mut self) {
        self.state = VerifyState::Idle;
        self.endpoint.clear();
    }

    fn reject(&self, intent: &'static str) -> FlowError {
        FlowError::InvalidIntent {
            kind: ExchangeKind::Verify,
            intent,
            stage: self.stage(),
        }
    }
}
