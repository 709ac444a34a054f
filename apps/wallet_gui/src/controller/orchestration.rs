//! Command orchestration helpers from UI actions to backend command queue.

use client_core::{ExchangeRequest, Presenter, UserIntent};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Hands an intent to the presenter and queues any request it produces.
pub fn route_intent(cmd_tx: &Sender<BackendCommand>, presenter: &mut Presenter, intent: UserIntent) {
    if let Some(request) = presenter.handle(intent) {
        dispatch_exchange(cmd_tx, request, presenter);
    }
}

/// Queues a request for the worker. If it cannot be queued the request is
/// settled on the spot as a transport failure so the flow does not stay
/// stuck in a waiting stage.
pub fn dispatch_exchange(
    cmd_tx: &Sender<BackendCommand>,
    request: ExchangeRequest,
    presenter: &mut Presenter,
) {
    let cmd_name = request.name();

    let err = match cmd_tx.try_send(BackendCommand::Exchange(request)) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            return;
        }
        Err(err) => err,
    };

    let reason = match &err {
        TrySendError::Full(_) => "exchange queue is full",
        TrySendError::Disconnected(_) => "exchange worker disconnected",
    };
    tracing::warn!(command = cmd_name, "{reason}");

    if let BackendCommand::Exchange(request) = err.into_inner() {
        presenter.resolve(request.fail(reason));
    }
}

pub fn apply_ui_event(presenter: &mut Presenter, event: UiEvent, status: &mut String) {
    match event {
        UiEvent::BackendReady => {
            *status = "Connected".to_string();
        }
        UiEvent::BackendFailed(message) => {
            *status = message;
        }
        UiEvent::ExchangeSettled(reply) => presenter.resolve(reply),
    }
}
