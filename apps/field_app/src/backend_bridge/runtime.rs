//! Runtime bridge between the controller's command queue and backend results.

use std::{thread, time::Duration};

use client_core::{encode_all, Collaborators};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, info};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{PhotoField, UiEvent};

/// Spawns the worker thread. It exits once every command sender is dropped.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    collaborators: Collaborators,
    probe_interval: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendUnavailable(format!(
                    "backend worker startup failure: {err}"
                )));
                return;
            }
        };

        runtime.block_on(async move {
            if collaborators.connectivity.is_some() && !probe_interval.is_zero() {
                tokio::spawn(watch_connectivity(
                    collaborators.clone(),
                    ui_tx.clone(),
                    probe_interval,
                ));
            }
            info!("backend worker ready");

            while let Ok(cmd) = cmd_rx.recv() {
                debug!(command = cmd.name(), "backend command received");
                tokio::spawn(handle_command(cmd, collaborators.clone(), ui_tx.clone()));
            }
            info!("command queue closed; backend worker stopping");
        });
    })
}

async fn handle_command(cmd: BackendCommand, collaborators: Collaborators, ui_tx: Sender<UiEvent>) {
    let event = match cmd {
        BackendCommand::GenerateDescription(request) => {
            UiEvent::DescriptionGenerated(collaborators.descriptions.generate(&request).await)
        }
        BackendCommand::EncodeImages { field, paths } => {
            let mut images = encode_all(collaborators.images.as_ref(), &paths).await;
            if field == PhotoField::Signature {
                images.truncate(1);
            }
            UiEvent::PhotosEncoded { field, images }
        }
        BackendCommand::ProbeConnectivity => UiEvent::ConnectivityChanged(probe(&collaborators).await),
    };
    if ui_tx.send(event).is_err() {
        debug!("controller gone; dropping backend result");
    }
}

async fn watch_connectivity(collaborators: Collaborators, ui_tx: Sender<UiEvent>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    let mut last = None;
    loop {
        ticker.tick().await;
        let online = probe(&collaborators).await;
        if last != Some(online) {
            info!(online, "connectivity changed");
            if ui_tx.send(UiEvent::ConnectivityChanged(online)).is_err() {
                return;
            }
            last = Some(online);
        }
    }
}

/// No probe configured means the app assumes it is online.
async fn probe(collaborators: &Collaborators) -> bool {
    match &collaborators.connectivity {
        Some(probe) => probe.is_online().await,
        None => true,
    }
}
