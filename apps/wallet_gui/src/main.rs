use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{
    config::{load_settings_from, normalize_service_url, DEFAULT_SETTINGS_FILE},
    ExchangeClient,
};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::commands::BackendCommand, controller::events::UiEvent, ui::WalletApp,
};

#[derive(Parser, Debug)]
#[command(about = "Desktop wallet for verifiable credential verify and issue exchanges")]
struct Args {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    /// Base URL of the wallet service. Overrides the settings file and
    /// environment.
    #[arg(long)]
    service_url: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings_from(&args.config, |name| std::env::var(name).ok());
    if let Some(service_url) = args.service_url {
        settings.service_url = normalize_service_url(&service_url);
    }
    tracing::info!(service_url = %settings.service_url, "starting desktop wallet");

    let client = ExchangeClient::from_settings(&settings)
        .with_context(|| format!("invalid service url '{}'", settings.service_url))?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, client);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Credential Wallet")
            .with_inner_size([560.0, 440.0])
            .with_min_inner_size([420.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Credential Wallet",
        options,
        Box::new(move |_cc| Ok(Box::new(WalletApp::new(cmd_tx, ui_rx, &settings)))),
    )
    .map_err(|err| anyhow!("desktop wallet exited with an error: {err}"))
}
