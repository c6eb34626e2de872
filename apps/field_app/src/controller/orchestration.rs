//! Command orchestration helpers from reducer output to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` without blocking. On failure `status` gets an operator-facing
/// message and `false` is returned.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut Option<String>,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "backend command queue full");
            *status = Some("Fila de comandos cheia; tente novamente.".to_string());
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "backend command processor disconnected");
            *status = Some(
                "Serviços em segundo plano indisponíveis; descrição automática e fotos desativadas."
                    .to_string(),
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn full_and_closed_queues_report_status() {
        let (tx, rx) = bounded(1);
        let mut status = None;

        assert!(dispatch_backend_command(&tx, BackendCommand::ProbeConnectivity, &mut status));
        assert!(status.is_none());

        assert!(!dispatch_backend_command(&tx, BackendCommand::ProbeConnectivity, &mut status));
        assert!(status.as_deref().is_some_and(|s| s.contains("cheia")));

        drop(rx);
        assert!(!dispatch_backend_command(&tx, BackendCommand::ProbeConnectivity, &mut status));
        assert!(status.as_deref().is_some_and(|s| s.contains("indisponíveis")));
    }
}
