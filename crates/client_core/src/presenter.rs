//! Headless presentation layer: shared loading/alert state plus routing of
//! user intents to whichever flow is on screen.

use shared::{alert::Alert, domain::ExchangeKind};
use tracing::warn;

use crate::{
    config::ClientSettings,
    exchange::ExchangeService,
    flow::{
        ExchangeReply, ExchangeRequest, FlowError, FlowEvent, FlowSink, FlowStage, IssueFlow,
        VerifyFlow,
    },
};

/// Loading indicator and current alert, shared by both flows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    is_loading: bool,
    current_alert: Option<Alert>,
}

impl UiState {
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn current_alert(&self) -> Option<&Alert> {
        self.current_alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.current_alert = None;
    }
}

impl FlowSink for UiState {
    fn emit(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::LoadingChanged(is_loading) => self.is_loading = is_loading,
            FlowEvent::AlertRaised(alert) => self.current_alert = Some(alert),
            FlowEvent::AlertCleared => self.current_alert = None,
        }
    }
}

/// Per-flow wording. Both flows share one state machine shape; only the
/// words on screen differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLabels {
    pub tab: &'static str,
    pub title: &'static str,
    pub submit: &'static str,
    pub accept: &'static str,
    pub deny: &'static str,
    pub submit_fields: &'static str,
}

impl FlowLabels {
    pub fn for_kind(kind: ExchangeKind) -> Self {
        match kind {
            ExchangeKind::Verify => Self {
                tab: "Verify",
                title: "Send a Verify Request",
                submit: "Submit",
                accept: "Accept",
                deny: "Deny",
                submit_fields: "Submit",
            },
            ExchangeKind::Issue => Self {
                tab: "Issue",
                title: "Send an Issue Request",
                submit: "Submit",
                accept: "Proceed",
                deny: "Abort",
                submit_fields: "Submit",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    SelectFlow(ExchangeKind),
    EditEndpoint(String),
    Submit,
    Accept,
    Deny,
    EditField { name: String, value: String },
    DismissAlert,
}

impl UserIntent {
    fn name(&self) -> &'static str {
        match self {
            Self::SelectFlow(_) => "select flow",
            Self::EditEndpoint(_) => "edit endpoint",
            Self::Submit => "submit",
            Self::Accept => "accept",
            Self::Deny => "deny",
            Self::EditField { .. } => "edit field",
            Self::DismissAlert => "dismiss alert",
        }
    }
}

pub struct Presenter {
    active: ExchangeKind,
    ui: UiState,
    verify: VerifyFlow,
    issue: IssueFlow,
}

impl Presenter {
    pub fn new(settings: &ClientSettings) -> Self {
        Self {
            active: ExchangeKind::Verify,
            ui: UiState::default(),
            verify: VerifyFlow::new(settings.verify_endpoint.clone()),
            issue: IssueFlow::new(settings.issue_endpoint.clone()),
        }
    }

    pub fn active(&self) -> ExchangeKind {
        self.active
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn verify(&self) -> &VerifyFlow {
        &self.verify
    }

    pub fn issue(&self) -> &IssueFlow {
        &self.issue
    }

    pub fn labels(&self) -> FlowLabels {
        FlowLabels::for_kind(self.active)
    }

    pub fn active_stage(&self) -> FlowStage {
        match self.active {
            ExchangeKind::Verify => self.verify.stage(),
            ExchangeKind::Issue => self.issue.stage(),
        }
    }

    pub fn endpoint(&self) -> &str {
        match self.active {
            ExchangeKind::Verify => self.verify.endpoint(),
            ExchangeKind::Issue => self.issue.endpoint(),
        }
    }

    /// Routes an intent. Intents the current stage does not accept are
    /// logged and dropped. A returned request must be executed and its reply
    /// passed to [`Presenter::resolve`].
    pub fn handle(&mut self, intent: UserIntent) -> Option<ExchangeRequest> {
        let name = intent.name();
        match self.try_handle(intent) {
            Ok(request) => request,
            Err(err) => {
                warn!(intent = name, "ignored user intent: {err}");
                None
            }
        }
    }

    pub fn try_handle(&mut self, intent: UserIntent) -> Result<Option<ExchangeRequest>, FlowError> {
        match intent {
            UserIntent::SelectFlow(kind) => {
                if kind != self.active && self.ui.is_loading() {
                    return Err(FlowError::InvalidIntent {
                        kind: self.active,
                        intent: "switch flow",
                        stage: self.active_stage(),
                    });
                }
                self.active = kind;
                Ok(None)
            }
            UserIntent::DismissAlert => {
                self.ui.dismiss_alert();
                Ok(None)
            }
            UserIntent::EditEndpoint(endpoint) => {
                match self.active {
                    ExchangeKind::Verify => self.verify.set_endpoint(endpoint)?,
                    ExchangeKind::Issue => self.issue.set_endpoint(endpoint)?,
                }
                Ok(None)
            }
            UserIntent::Submit => match self.active {
                ExchangeKind::Verify => self.verify.begin_submit(&mut self.ui).map(Some),
                ExchangeKind::Issue if self.issue.stage() == FlowStage::CollectingFields => {
                    self.issue.begin_submit_fields(&mut self.ui).map(Some)
                }
                ExchangeKind::Issue => self.issue.begin_submit(&mut self.ui).map(Some),
            },
            UserIntent::Accept => match self.active {
                ExchangeKind::Verify => self.verify.begin_accept(&mut self.ui).map(Some),
                ExchangeKind::Issue => self.issue.proceed().map(|()| None),
            },
            UserIntent::Deny => match self.active {
                ExchangeKind::Verify => self.verify.deny(&mut self.ui).map(|()| None),
                ExchangeKind::Issue => self.issue.abort(&mut self.ui).map(|()| None),
            },
            UserIntent::EditField { name, value } => match self.active {
                ExchangeKind::Issue => self.issue.edit_field(&name, value).map(|()| None),
                ExchangeKind::Verify => Err(FlowError::InvalidIntent {
                    kind: ExchangeKind::Verify,
                    intent: "edit field",
                    stage: self.verify.stage(),
                }),
            },
        }
    }

    /// Applies a settled request to the flow that issued it.
    pub fn resolve(&mut self, reply: ExchangeReply) {
        let name = reply.name();
        if let Err(err) = self.try_resolve(reply) {
            warn!(reply = name, "dropped exchange reply: {err}");
        }
    }

    pub fn try_resolve(&mut self, reply: ExchangeReply) -> Result<(), FlowError> {
        match reply.kind() {
            ExchangeKind::Verify => self.verify.apply(reply, &mut self.ui),
            ExchangeKind::Issue => self.issue.apply(reply, &mut self.ui),
        }
    }

    /// Handles an intent and, if it needs the network, runs the call to
    /// completion before returning.
    pub async fn dispatch<S>(&mut self, intent: UserIntent, service: &S)
    where
        S: ExchangeService + ?Sized,
    {
        if let Some(request) = self.handle(intent) {
            let reply = request.execute(service).await;
            self.resolve(reply);
        }
    }
}

#[cfg(test)]
#[path = "tests/presenter_tests.rs"]
mod tests;
