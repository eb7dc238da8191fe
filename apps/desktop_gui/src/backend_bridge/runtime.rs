//! Runtime bridge between the UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::CipherService;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::domain::{Operation, RequestId};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{UiError, UiErrorContext, UiEvent},
};

/// Starts the backend worker thread. It runs until every command sender is dropped.
pub fn launch(
    service: Arc<dyn CipherService>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));
        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), request_id = %cmd.request_id(), "backend received command");
                tokio::spawn(run_command(Arc::clone(&service), cmd, ui_tx.clone()));
            }
            tracing::info!("ui command channel closed; backend worker stopping");
        });
    })
}

async fn run_command(service: Arc<dyn CipherService>, cmd: BackendCommand, ui_tx: Sender<UiEvent>) {
    let operation = cmd.operation();
    let request_id = cmd.request_id();
    let guard = SettleGuard::new(operation, request_id, ui_tx);

    let result = match &cmd {
        BackendCommand::Encrypt { request, .. } => service.encrypt(request).await,
        BackendCommand::Decrypt { request, .. } => service.decrypt(request).await,
    };

    let outcome = match result {
        Ok(output) => {
            tracing::info!(operation = operation.as_str(), %request_id, "cipher request succeeded");
            Ok(output)
        }
        Err(err) => {
            tracing::warn!(operation = operation.as_str(), %request_id, error = %err, "cipher request failed");
            Err(UiError::from_client_error(operation, &err))
        }
    };
    guard.settle(outcome);
}

/// Reports the settlement of one request. Dropping it unsettled (the task
/// panicked or was cancelled) reports a failure instead, so the UI never
/// keeps a request in flight forever.
struct SettleGuard {
    operation: Operation,
    request_id: RequestId,
    ui_tx: Sender<UiEvent>,
    settled: bool,
}

impl SettleGuard {
    fn new(operation: Operation, request_id: RequestId, ui_tx: Sender<UiEvent>) -> Self {
        Self {
            operation,
            request_id,
            ui_tx,
            settled: false,
        }
    }

    fn settle(mut self, outcome: Result<String, UiError>) {
        self.send(outcome);
    }

    fn send(&mut self, outcome: Result<String, UiError>) {
        self.settled = true;
        let event = UiEvent::OperationSettled {
            operation: self.operation,
            request_id: self.request_id,
            outcome,
        };
        match self.ui_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::error!(
                operation = self.operation.as_str(),
                request_id = %self.request_id,
                "backend->ui event queue is full; settlement dropped"
            ),
            Err(TrySendError::Disconnected(_)) => tracing::debug!(
                operation = self.operation.as_str(),
                request_id = %self.request_id,
                "ui gone before settlement"
            ),
        }
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::error!(
            operation = self.operation.as_str(),
            request_id = %self.request_id,
            "cipher request ended without a result"
        );
        let err = UiError::from_message(
            self.operation.into(),
            format!("{} request ended before the server replied", self.operation),
        );
        self.send(Err(err));
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
