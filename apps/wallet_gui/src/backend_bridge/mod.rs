//! Bridge between the UI thread and the exchange worker.

pub mod commands;
pub mod runtime;
