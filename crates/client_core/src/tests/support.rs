//! Scripted stand-in for the wallet service used by the flow and presenter
//! tests. Replies go through the real response classifier.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared::{
    domain::{FieldForm, IssuePrompt, VerifyPrompt},
    protocol::FinalizeAck,
};

use crate::exchange::{classify_response, ExchangeError, ExchangeService, TransportError};

pub(crate) enum Step {
    Respond(u16, String),
    Unreachable,
}

impl Step {
    pub(crate) fn ok(body: serde_json::Value) -> Self {
        Self::Respond(200, body.to_string())
    }

    pub(crate) fn rejected(message: &str) -> Self {
        Self::Respond(200, serde_json::json!({ "error": message }).to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordedCall {
    InitiateVerify(String),
    FinalizeVerify(String),
    InitiateIssue(String),
    FinalizeIssue(String, FieldForm),
}

pub(crate) struct ScriptedService {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedService {
    pub(crate) fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn next<T: DeserializeOwned>(&self) -> Result<T, ExchangeError> {
        match self.steps.lock().expect("steps lock").pop_front() {
            Some(Step::Respond(status, body)) => classify_response(status, body.as_bytes()),
            Some(Step::Unreachable) => Err(TransportError::BackendUnavailable(
                "connection refused".to_string(),
            )
            .into()),
            None => Err(TransportError::BackendUnavailable("no scripted reply".to_string()).into()),
        }
    }
}

#[async_trait]
impl ExchangeService for ScriptedService {
    async fn initiate_verify(&self, endpoint: &str) -> Result<VerifyPrompt, ExchangeError> {
        self.record(RecordedCall::InitiateVerify(endpoint.to_string()));
        self.next()
    }

    async fn finalize_verify(&self, endpoint: &str) -> Result<FinalizeAck, ExchangeError> {
        self.record(RecordedCall::FinalizeVerify(endpoint.to_string()));
        self.next()
    }

    async fn initiate_issue(&self, endpoint: &str) -> Result<IssuePrompt, ExchangeError> {
        self.record(RecordedCall::InitiateIssue(endpoint.to_string()));
        self.next()
    }

    async fn finalize_issue(
        &self,
        endpoint: &str,
        fields: &FieldForm,
    ) -> Result<FinalizeAck, ExchangeError> {
        self.record(RecordedCall::FinalizeIssue(
            endpoint.to_string(),
            fields.clone(),
        ));
        self.next()
    }
}

pub(crate) fn acme_prompt() -> serde_json::Value {
    serde_json::json!({
        "name": "Acme",
        "domain": "acme.com",
        "purpose": "age check",
        "trusted_by_issuer": true
    })
}

pub(crate) fn university_prompt() -> serde_json::Value {
    serde_json::json!({
        "name": "State University",
        "domain": "uni.example",
        "purpose": "diploma",
        "fields": { "dob": "", "name": "" }
    })
}
