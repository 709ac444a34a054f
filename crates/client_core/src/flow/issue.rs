use std::mem;

use shared::{
    alert::Alert,
    domain::{is_submittable_endpoint, ExchangeKind, FieldForm, IssuePrompt},
};
use tracing::debug;

use super::{begin_request, settle, ExchangeReply, ExchangeRequest, FlowError, FlowEvent, FlowSink, FlowStage};
use crate::exchange::ExchangeService;

pub const ISSUE_ABORTED_TEXT: &str = "Issue request aborted.";
pub const CREDENTIALS_CREATED_TEXT: &str = "Verifiable Credentials Created!";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IssueState {
    #[default]
    Idle,
    AwaitingPrompt,
    PromptReady(IssuePrompt),
    /// Issuer fields being filled in; nothing is sent until submit.
    CollectingFields(FieldForm),
    Submitting,
}

impl IssueState {
    pub fn stage(&self) -> FlowStage {
        match self {
            Self::Idle => FlowStage::Idle,
            Self::AwaitingPrompt => FlowStage::AwaitingPrompt,
            Self::PromptReady(_) => FlowStage::PromptReady,
            Self::CollectingFields(_) => FlowStage::CollectingFields,
            Self::Submitting => FlowStage::Submitting,
        }
    }
}

/// Drives an issuance exchange. Unlike verify, accepting the prompt only
/// opens a form; the issuer is contacted again when the form is submitted.
#[derive(Debug, Clone, Default)]
pub struct IssueFlow {
    endpoint: String,
    state: IssueState,
}

impl IssueFlow {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: IssueState::Idle,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> &IssueState {
        &self.state
    }

    pub fn stage(&self) -> FlowStage {
        self.state.stage()
    }

    pub fn prompt(&self) -> Option<&IssuePrompt> {
        match &self.state {
            IssueState::PromptReady(prompt) => Some(prompt),
            _ => None,
        }
    }

    pub fn field_form(&self) -> Option<&FieldForm> {
        match &self.state {
            IssueState::CollectingFields(form) => Some(form),
            _ => None,
        }
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) -> Result<(), FlowError> {
        if !matches!(self.state, IssueState::Idle) {
            return Err(self.reject("edit endpoint"));
        }
        self.endpoint = endpoint.into();
        Ok(())
    }

    pub fn begin_submit(&mut self, sink: &mut dyn FlowSink) -> Result<ExchangeRequest, FlowError> {
        if !matches!(self.state, IssueState::Idle) {
            return Err(self.reject("submit"));
        }
        if !is_submittable_endpoint(&self.endpoint) {
            return Err(FlowError::MissingEndpoint);
        }

        sink.emit(FlowEvent::AlertCleared);
        begin_request(sink);
        self.state = IssueState::AwaitingPrompt;
        debug!(endpoint = %self.endpoint, "issue prompt requested");
        Ok(ExchangeRequest::InitiateIssue {
            endpoint: self.endpoint.clone(),
        })
    }

    /// Turns the prompt's fields into an editable form. Local only.
    pub fn proceed(&mut self) -> Result<(), FlowError> {
        match mem::take(&mut self.state) {
            IssueState::PromptReady(prompt) => {
                self.state = IssueState::CollectingFields(FieldForm::from(prompt));
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.reject("proceed"))
            }
        }
    }

    /// Refuses the issuance, from the prompt or from the field form.
    pub fn abort(&mut self, sink: &mut dyn FlowSink) -> Result<(), FlowError> {
        if !matches!(
            self.state,
            IssueState::PromptReady(_) | IssueState::CollectingFields(_)
        ) {
            return Err(self.reject("abort"));
        }

        self.finish();
        sink.emit(FlowEvent::AlertRaised(Alert::warning(ISSUE_ABORTED_TEXT)));
        Ok(())
    }

    pub fn edit_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), FlowError> {
        let stage = self.stage();
        let IssueState::CollectingFields(form) = &mut self.state else {
            return Err(FlowError::InvalidIntent {
                kind: ExchangeKind::Issue,
                intent: "edit field",
                stage,
            });
        };

        if form.set(name, value) {
            Ok(())
        } else {
            Err(FlowError::UnknownField(name.to_string()))
        }
    }

    pub fn begin_submit_fields(
        &mut self,
        sink: &mut dyn FlowSink,
    ) -> Result<ExchangeRequest, FlowError> {
        match mem::take(&mut self.state) {
            IssueState::CollectingFields(fields) => {
                begin_request(sink);
                self.state = IssueState::Submitting;
                debug!(endpoint = %self.endpoint, fields = fields.len(), "issue fields submitted");
                Ok(ExchangeRequest::FinalizeIssue {
                    endpoint: self.endpoint.clone(),
                    fields,
                })
            }
            other => {
                self.state = other;
                Err(self.reject("submit fields"))
            }
        }
    }

    pub fn apply(&mut self, reply: ExchangeReply, sink: &mut dyn FlowSink) -> Result<(), FlowError> {
        match reply {
            ExchangeReply::IssuePrompt(result) => {
                if !matches!(self.state, IssueState::AwaitingPrompt) {
                    return Err(self.reject("prompt reply"));
                }
                self.state = match settle(ExchangeKind::Issue, "initiate", result, sink) {
                    Some(prompt) => IssueState::PromptReady(prompt),
                    None => IssueState::Idle,
                };
                Ok(())
            }
            ExchangeReply::IssueFinalized(result) => {
                if !matches!(self.state, IssueState::Submitting) {
                    return Err(self.reject("finalize reply"));
                }
                self.finish();
                if settle(ExchangeKind::Issue, "finalize", result, sink).is_some() {
                    sink.emit(FlowEvent::AlertRaised(Alert::success(
                        CREDENTIALS_CREATED_TEXT,
                    )));
                }
                Ok(())
            }
            other => Err(FlowError::MismatchedReply {
                kind: ExchangeKind::Issue,
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

    pub async fn submit_fields<S>(
        &mut self,
        service: &S,
        sink: &mut dyn FlowSink,
    ) -> Result<(), FlowError>
    where
        S: ExchangeService + ?Sized,
    {
        let request = self.begin_submit_fields(sink)?;
        let reply = request.execute(service).await;
        self.apply(reply, sink)
    }

    fn finish(&mut self) {
        self.state = IssueState::Idle;
        self.endpoint.clear();
    }

    fn reject(&self, intent: &'static str) -> FlowError {
        FlowError::InvalidIntent {
            kind: ExchangeKind::Issue,
            intent,
            stage: self.stage(),
        }
    }
}
