//! Controller layer: backend events and routing of UI intents to the presenter.

pub mod events;
pub mod orchestration;
