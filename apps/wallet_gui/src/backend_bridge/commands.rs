//! Backend commands queued from UI to backend worker.

use client_core::ExchangeRequest;

pub enum BackendCommand {
    Exchange(ExchangeRequest),
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exchange(request) => request.name(),
            Self::Shutdown => "shutdown",
        }
    }
}
