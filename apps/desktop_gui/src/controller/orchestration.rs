//! Command orchestration from UI actions to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{UiError, UiErrorCategory, UiErrorContext},
};

/// Queues `cmd` without blocking the UI thread. On failure the command is
/// dropped and the caller must roll back any busy state it set.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), UiError> {
    let cmd_name = cmd.name();
    let context: UiErrorContext = cmd.operation().into();
    let request_id = cmd.request_id();

    tracing::debug!(command = cmd_name, %request_id, "queueing ui->backend command");
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, %request_id, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, %request_id, "ui->backend command queue is full");
            Err(UiError::new(
                UiErrorCategory::Transport,
                context,
                "UI command queue is full; please retry",
            ))
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, %request_id, "ui->backend command queue disconnected");
            Err(UiError::new(
                UiErrorCategory::Transport,
                context,
                "Backend command processor disconnected (possible startup/runtime failure); restart the app",
            ))
        }
    }
}
