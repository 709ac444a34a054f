//! Client side of the credential exchange: the HTTP client for the wallet
//! service, the verify and issue consent flows, and the presentation state
//! that ties them to a user interface.

pub mod config;
pub mod exchange;
pub mod flow;
pub mod presenter;

pub use config::ClientSettings;
pub use exchange::{ExchangeClient, ExchangeError, ExchangeService, TransportError};
pub use flow::{
    ExchangeReply, ExchangeRequest, FlowError, FlowEvent, FlowSink, FlowStage, IssueFlow,
    IssueState, VerifyFlow, VerifyState,
};
pub use presenter::{FlowLabels, Presenter, UiState, UserIntent};

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;
