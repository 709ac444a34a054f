//! Runtime bridge between UI command queue and backend event intake.

use std::thread::{self, JoinHandle};

use client_core::{ExchangeClient, ExchangeService};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    client: ExchangeClient,
) -> JoinHandle<()> {
    launch_with(cmd_rx, ui_tx, client)
}

/// Starts the worker thread. Requests are executed strictly one after the
/// other; there is never more than one call in flight.
pub fn launch_with<S>(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    service: S,
) -> JoinHandle<()>
where
    S: ExchangeService + 'static,
{
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "exchange worker startup failure: {err}"
                )));
                return;
            }
        };

        let _ = ui_tx.try_send(UiEvent::BackendReady);
        tracing::info!("exchange worker ready");

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let name = cmd.name();
                match cmd {
                    BackendCommand::Exchange(request) => {
                        tracing::debug!(command = name, "running exchange request");
                        let reply = request.execute(&service).await;
                        if ui_tx.send(UiEvent::ExchangeSettled(reply)).is_err() {
                            tracing::warn!(command = name, "ui event queue closed; dropping reply");
                            break;
                        }
                    }
                    BackendCommand::Shutdown => break,
                }
            }
        });

        tracing::info!("exchange worker stopped");
    })
}
