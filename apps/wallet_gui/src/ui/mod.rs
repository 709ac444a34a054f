//! UI layer for the desktop wallet: app shell and reusable widgets.

pub mod app;
pub mod widgets;

pub use app::WalletApp;
