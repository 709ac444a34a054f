//! Events posted by the backend worker for the UI thread.

use client_core::ExchangeReply;

#[derive(Debug)]
pub enum UiEvent {
    BackendReady,
    BackendFailed(String),
    ExchangeSettled(ExchangeReply),
}
