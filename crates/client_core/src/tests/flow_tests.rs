use super::*;
use crate::support::{acme_prompt, university_prompt, RecordedCall, ScriptedService, Step};
use shared::alert::{AlertKind, INTERNAL_ERROR_TEXT};

use super::issue::{CREDENTIALS_CREATED_TEXT, ISSUE_ABORTED_TEXT};
use super::verify::{VERIFIED_TEXT, VERIFY_DENIED_TEXT};

const VERIFIER: &str = "https://issuer.example";
const ISSUER: &str = "https://uni.example/issue";

fn alerts(events: &[FlowEvent]) -> Vec<Alert> {
    events
        .iter()
        .filter_map(|event| match event {
            FlowEvent::AlertRaised(alert) => Some(alert.clone()),
            _ => None,
        })
        .collect()
}

fn loading(events: &[FlowEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|event| match event {
            FlowEvent::LoadingChanged(is_loading) => Some(*is_loading),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn verify_submit_stores_prompt() {
    let service = ScriptedService::new([Step::ok(acme_prompt())]);
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");

    assert_eq!(flow.stage(), FlowStage::PromptReady);
    let prompt = flow.prompt().expect("prompt");
    assert_eq!(prompt.name, "Acme");
    assert_eq!(prompt.domain, "acme.com");
    assert_eq!(prompt.purpose, "age check");
    assert!(prompt.trusted_by_issuer);
    assert_eq!(
        events,
        vec![
            FlowEvent::AlertCleared,
            FlowEvent::LoadingChanged(true),
            FlowEvent::LoadingChanged(false),
        ]
    );
    assert_eq!(
        service.calls(),
        vec![RecordedCall::InitiateVerify(VERIFIER.to_string())]
    );
}

#[tokio::test]
async fn verify_accept_surfaces_service_error_verbatim() {
    let service = ScriptedService::new([
        Step::ok(acme_prompt()),
        Step::rejected("revoked credential"),
    ]);
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");
    flow.accept(&service, &mut events).await.expect("accept");

    assert_eq!(flow.stage(), FlowStage::Idle);
    assert!(flow.prompt().is_none());
    assert_eq!(flow.endpoint(), "");
    assert_eq!(alerts(&events), vec![Alert::error("revoked credential")]);
    assert_eq!(loading(&events), vec![true, false, true, false]);
}

#[tokio::test]
async fn verify_accept_with_structured_error_is_not_verified() {
    let service = ScriptedService::new([
        Step::ok(acme_prompt()),
        Step::ok(serde_json::json!({ "error": { "message": "revoked credential" } })),
    ]);
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");
    flow.accept(&service, &mut events).await.expect("accept");

    assert_eq!(flow.stage(), FlowStage::Idle);
    assert_eq!(alerts(&events), vec![Alert::internal_error()]);
    assert!(!alerts(&events).contains(&Alert::success(VERIFIED_TEXT)));
}

#[tokio::test]
async fn verify_accept_success_reports_verified() {
    let service = ScriptedService::new([
        Step::ok(acme_prompt()),
        Step::ok(serde_json::json!({ "success": true })),
    ]);
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");
    flow.accept(&service, &mut events).await.expect("accept");

    assert_eq!(flow.stage(), FlowStage::Idle);
    assert_eq!(flow.endpoint(), "");
    assert_eq!(alerts(&events), vec![Alert::success(VERIFIED_TEXT)]);
    assert_eq!(
        service.calls(),
        vec![
            RecordedCall::InitiateVerify(VERIFIER.to_string()),
            RecordedCall::FinalizeVerify(VERIFIER.to_string()),
        ]
    );
}

#[tokio::test]
async fn verify_deny_is_local() {
    let service = ScriptedService::new([Step::ok(acme_prompt())]);
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");
    events.clear();
    flow.deny(&mut events).expect("deny");

    assert_eq!(flow.stage(), FlowStage::Idle);
    assert!(flow.prompt().is_none());
    assert_eq!(flow.endpoint(), "");
    assert_eq!(
        events,
        vec![FlowEvent::AlertRaised(Alert::warning(VERIFY_DENIED_TEXT))]
    );
    assert_eq!(service.calls().len(), 1);
}

#[tokio::test]
async fn verify_transport_failure_uses_fixed_text_and_keeps_endpoint() {
    let service = ScriptedService::new([Step::Unreachable]);
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");

    assert_eq!(flow.stage(), FlowStage::Idle);
    assert_eq!(flow.endpoint(), VERIFIER);
    assert_eq!(alerts(&events), vec![Alert::internal_error()]);
    assert_eq!(loading(&events), vec![true, false]);
}

#[tokio::test]
async fn server_error_body_is_hidden_behind_internal_error() {
    let service = ScriptedService::new([Step::Respond(
        500,
        serde_json::json!({ "error": "an internal error occurred" }).to_string(),
    )]);
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");

    let raised = alerts(&events);
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].kind(), AlertKind::Error);
    assert_eq!(raised[0].text(), INTERNAL_ERROR_TEXT);
}

#[tokio::test]
async fn verify_accept_transport_failure_clears_endpoint() {
    let service = ScriptedService::new([Step::ok(acme_prompt()), Step::Unreachable]);
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");
    flow.accept(&service, &mut events).await.expect("accept");

    assert_eq!(flow.stage(), FlowStage::Idle);
    assert_eq!(flow.endpoint(), "");
    assert_eq!(alerts(&events), vec![Alert::internal_error()]);
}

#[test]
fn verify_begin_submit_marks_loading_until_settled() {
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    let request = flow.begin_submit(&mut events).expect("begin");

    assert_eq!(
        request,
        ExchangeRequest::InitiateVerify {
            endpoint: VERIFIER.to_string()
        }
    );
    assert_eq!(flow.stage(), FlowStage::AwaitingPrompt);
    assert!(flow.stage().is_pending());
    assert_eq!(events.last(), Some(&FlowEvent::LoadingChanged(true)));

    let resubmit = flow.begin_submit(&mut events);
    assert_eq!(
        resubmit,
        Err(FlowError::InvalidIntent {
            kind: ExchangeKind::Verify,
            intent: "submit",
            stage: FlowStage::AwaitingPrompt,
        })
    );
    assert!(flow.set_endpoint("https://other.example").is_err());
    assert_eq!(flow.endpoint(), VERIFIER);

    flow.apply(request.fail("queue closed"), &mut events)
        .expect("apply");
    assert_eq!(flow.stage(), FlowStage::Idle);
    assert_eq!(events.last(), Some(&FlowEvent::AlertRaised(Alert::internal_error())));
}

#[test]
fn verify_rejects_stray_intents_without_side_effects() {
    let mut flow = VerifyFlow::new(VERIFIER);
    let mut events = Vec::new();

    assert!(matches!(
        flow.begin_accept(&mut events),
        Err(FlowError::InvalidIntent { intent: "accept", stage: FlowStage::Idle, .. })
    ));
    assert!(matches!(
        flow.deny(&mut events),
        Err(FlowError::InvalidIntent { intent: "deny", .. })
    ));
    assert!(matches!(
        flow.apply(ExchangeReply::VerifyFinalized(Ok(FinalizeAck::default())), &mut events),
        Err(FlowError::InvalidIntent { intent: "finalize reply", .. })
    ));
    assert_eq!(
        flow.apply(ExchangeReply::IssueFinalized(Ok(FinalizeAck::default())), &mut events),
        Err(FlowError::MismatchedReply {
            kind: ExchangeKind::Verify,
            reply: "issue finalize",
        })
    );
    assert!(events.is_empty());
    assert_eq!(flow.stage(), FlowStage::Idle);
}

#[test]
fn blank_endpoint_is_not_submitted() {
    let mut flow = VerifyFlow::new("  ");
    let mut events = Vec::new();

    assert_eq!(flow.begin_submit(&mut events), Err(FlowError::MissingEndpoint));
    assert_eq!(flow.stage(), FlowStage::Idle);
    assert!(events.is_empty());
}

#[tokio::test]
async fn issue_initiation_transport_failure_returns_to_idle() {
    let service = ScriptedService::new([Step::Unreachable]);
    let mut flow = IssueFlow::new(ISSUER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");

    assert_eq!(flow.stage(), FlowStage::Idle);
    assert!(flow.prompt().is_none());
    assert_eq!(alerts(&events), vec![Alert::internal_error()]);
    assert_eq!(loading(&events), vec![true, false]);
}

#[tokio::test]
async fn issue_proceed_seeds_form_and_submits_edits() {
    let service = ScriptedService::new([Step::ok(university_prompt()), Step::ok(serde_json::json!({}))]);
    let mut flow = IssueFlow::new(ISSUER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");
    assert_eq!(flow.stage(), FlowStage::PromptReady);

    flow.proceed().expect("proceed");
    assert_eq!(service.calls().len(), 1);
    assert!(flow.prompt().is_none());
    let form = flow.field_form().expect("form");
    assert_eq!(
        form.iter().collect::<Vec<_>>(),
        vec![("dob", ""), ("name", "")]
    );

    flow.edit_field("name", "Alice").expect("edit");
    flow.submit_fields(&service, &mut events)
        .await
        .expect("submit fields");

    let expected_fields = FieldForm::from_fields(
        [("name", "Alice"), ("dob", "")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    assert_eq!(
        service.calls().last(),
        Some(&RecordedCall::FinalizeIssue(ISSUER.to_string(), expected_fields))
    );
    assert_eq!(flow.stage(), FlowStage::Idle);
    assert!(flow.field_form().is_none());
    assert_eq!(flow.endpoint(), "");
    assert_eq!(alerts(&events), vec![Alert::success(CREDENTIALS_CREATED_TEXT)]);
}

#[tokio::test]
async fn issue_abort_works_from_prompt_and_form() {
    let service = ScriptedService::new([Step::ok(university_prompt()), Step::ok(university_prompt())]);
    let mut flow = IssueFlow::new(ISSUER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");
    flow.abort(&mut events).expect("abort prompt");
    assert_eq!(flow.stage(), FlowStage::Idle);
    assert_eq!(flow.endpoint(), "");

    flow.set_endpoint(ISSUER).expect("endpoint");
    flow.submit(&service, &mut events).await.expect("submit again");
    flow.proceed().expect("proceed");
    flow.abort(&mut events).expect("abort form");

    assert_eq!(flow.stage(), FlowStage::Idle);
    assert!(flow.field_form().is_none());
    assert_eq!(
        alerts(&events),
        vec![
            Alert::warning(ISSUE_ABORTED_TEXT),
            Alert::warning(ISSUE_ABORTED_TEXT),
        ]
    );
    assert_eq!(service.calls().len(), 2);
}

#[tokio::test]
async fn issue_finalize_application_error_clears_endpoint() {
    let service = ScriptedService::new([
        Step::ok(university_prompt()),
        Step::rejected("Issuer has invalid signature."),
    ]);
    let mut flow = IssueFlow::new(ISSUER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("submit");
    flow.proceed().expect("proceed");
    flow.submit_fields(&service, &mut events)
        .await
        .expect("submit fields");

    assert_eq!(flow.stage(), FlowStage::Idle);
    assert_eq!(flow.endpoint(), "");
    assert_eq!(
        alerts(&events),
        vec![Alert::error("Issuer has invalid signature.")]
    );
}

#[tokio::test]
async fn issue_edits_are_limited_to_form_fields() {
    let service = ScriptedService::new([Step::ok(university_prompt())]);
    let mut flow = IssueFlow::new(ISSUER);
    let mut events = Vec::new();

    assert!(matches!(
        flow.edit_field("name", "Alice"),
        Err(FlowError::InvalidIntent { intent: "edit field", .. })
    ));
    assert!(matches!(
        flow.proceed(),
        Err(FlowError::InvalidIntent { intent: "proceed", .. })
    ));

    flow.submit(&service, &mut events).await.expect("submit");
    flow.proceed().expect("proceed");

    assert_eq!(
        flow.edit_field("email", "alice@example.com"),
        Err(FlowError::UnknownField("email".to_string()))
    );
    assert_eq!(flow.stage(), FlowStage::CollectingFields);
}

#[tokio::test]
async fn resubmitting_after_idle_starts_a_fresh_cycle() {
    let service = ScriptedService::new([
        Step::ok(university_prompt()),
        Step::rejected("Invalid URL."),
        Step::ok(serde_json::json!({
            "name": "Bus Co",
            "domain": "bus.example",
            "purpose": "pass",
            "fields": { "route": "12" }
        })),
    ]);
    let mut flow = IssueFlow::new(ISSUER);
    let mut events = Vec::new();

    flow.submit(&service, &mut events).await.expect("first");
    flow.proceed().expect("proceed");
    flow.edit_field("name", "Alice").expect("edit");
    flow.abort(&mut events).expect("abort");

    flow.set_endpoint(ISSUER).expect("endpoint");
    flow.submit(&service, &mut events).await.expect("second");
    assert_eq!(flow.stage(), FlowStage::Idle);
    assert_eq!(flow.endpoint(), ISSUER);

    flow.submit(&service, &mut events).await.expect("third");
    flow.proceed().expect("proceed");
    let form = flow.field_form().expect("form");
    assert_eq!(form.get("route"), Some("12"));
    assert_eq!(form.get("name"), None);
    assert_eq!(
        service.calls(),
        vec![
            RecordedCall::InitiateIssue(ISSUER.to_string()),
            RecordedCall::InitiateIssue(ISSUER.to_string()),
            RecordedCall::InitiateIssue(ISSUER.to_string()),
        ]
    );
}
