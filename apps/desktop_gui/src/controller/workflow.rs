//! The encrypt/decrypt workflow controller.
//!
//! Owns all UI state and drives both operation flows:
//! collect input -> validate -> mark busy -> queue command -> settle -> notify.
//! The view only reports `(Control, ControlEvent)` pairs; everything else
//! happens here, so the controller runs unchanged against a headless view.

use std::{collections::HashMap, time::Instant};

use crossbeam_channel::{Receiver, Sender};
use shared::domain::{Operation, RequestId};

use crate::{
    backend_bridge::commands::BackendCommand,
    clipboard::ClipboardSink,
    controller::{
        events::{err_label, Control, ControlEvent, UiError, UiErrorContext, UiEvent},
        orchestration::dispatch_backend_command,
        state::{KeyIndicator, WorkflowState},
        validation::{
            assess_key_format, key_format_warning, validate_decrypt, validate_encrypt, KeyFormat,
            KeyRole, ValidationError,
        },
    },
    notifications::{NotificationCenter, NotificationKind},
};

pub type Handler = fn(&mut WorkflowController, Instant);

/// Registration table mapping a control interaction to its handler.
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<(Control, ControlEvent), Handler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings of the emoji cipher page.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(
            Control::EncryptButton,
            ControlEvent::Click,
            WorkflowController::submit_encrypt,
        );
        table.register(
            Control::DecryptButton,
            ControlEvent::Click,
            WorkflowController::submit_decrypt,
        );
        table.register(
            Control::PublicKeyField,
            ControlEvent::Input,
            WorkflowController::public_key_edited,
        );
        table.register(
            Control::PrivateKeyField,
            ControlEvent::Input,
            WorkflowController::private_key_edited,
        );
        table.register(
            Control::CopyEncrypted,
            ControlEvent::Click,
            WorkflowController::copy_encrypted,
        );
        table.register(
            Control::CopyDecrypted,
            ControlEvent::Click,
            WorkflowController::copy_decrypted,
        );
        table.register(
            Control::ClearEncrypted,
            ControlEvent::Click,
            WorkflowController::clear_encrypted,
        );
        table.register(
            Control::ClearDecrypted,
            ControlEvent::Click,
            WorkflowController::clear_decrypted,
        );
        table
    }

    /// Returns the handler previously bound to the pair, if any.
    pub fn register(
        &mut self,
        control: Control,
        event: ControlEvent,
        handler: Handler,
    ) -> Option<Handler> {
        self.handlers.insert((control, event), handler)
    }

    pub fn get(&self, control: Control, event: ControlEvent) -> Option<Handler> {
        self.handlers.get(&(control, event)).copied()
    }

    pub fn is_bound(&self, control: Control, event: ControlEvent) -> bool {
        self.handlers.contains_key(&(control, event))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

pub struct WorkflowController {
    state: WorkflowState,
    notifications: NotificationCenter,
    clipboard: Box<dyn ClipboardSink>,
    cmd_tx: Sender<BackendCommand>,
    handlers: HandlerTable,
    next_request_id: u64,
}

impl WorkflowController {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        clipboard: Box<dyn ClipboardSink>,
        notifications: NotificationCenter,
    ) -> Self {
        Self {
            state: WorkflowState::with_status("Connecting to backend worker..."),
            notifications,
            clipboard,
            cmd_tx,
            handlers: HandlerTable::standard(),
            next_request_id: 1,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut WorkflowState {
        &mut self.state
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Runs the handler bound to `(control, event)`. Returns `false` if none is bound.
    pub fn handle(&mut self, control: Control, event: ControlEvent, now: Instant) -> bool {
        match self.handlers.get(control, event) {
            Some(handler) => {
                handler(self, now);
                true
            }
            None => {
                tracing::debug!(?control, ?event, "no handler bound");
                false
            }
        }
    }

    pub fn submit_encrypt(&mut self, now: Instant) {
        match validate_encrypt(&self.state.message_input, &self.state.public_key_input) {
            Ok(request) => self.dispatch(Operation::Encrypt, now, |request_id| {
                BackendCommand::Encrypt {
                    request_id,
                    request,
                }
            }),
            Err(err) => self.reject(Operation::Encrypt, err, now),
        }
    }

    pub fn submit_decrypt(&mut self, now: Instant) {
        match validate_decrypt(&self.state.emojis_input, &self.state.private_key_input) {
            Ok(request) => self.dispatch(Operation::Decrypt, now, |request_id| {
                BackendCommand::Decrypt {
                    request_id,
                    request,
                }
            }),
            Err(err) => self.reject(Operation::Decrypt, err, now),
        }
    }

    pub fn public_key_edited(&mut self, now: Instant) {
        self.assess_key(KeyRole::Public, now);
    }

    pub fn private_key_edited(&mut self, now: Instant) {
        self.assess_key(KeyRole::Private, now);
    }

    pub fn copy_encrypted(&mut self, now: Instant) {
        self.copy_panel(Operation::Encrypt, "Encrypted emojis copied to clipboard!", now);
    }

    pub fn copy_decrypted(&mut self, now: Instant) {
        self.copy_panel(Operation::Decrypt, "Decrypted message copied to clipboard!", now);
    }

    pub fn clear_encrypted(&mut self, now: Instant) {
        self.clear_panel(Operation::Encrypt, "Encrypted output cleared", now);
    }

    pub fn clear_decrypted(&mut self, now: Instant) {
        self.clear_panel(Operation::Decrypt, "Decrypted output cleared", now);
    }

    pub fn drain_events(&mut self, ui_rx: &Receiver<UiEvent>, now: Instant) {
        while let Ok(event) = ui_rx.try_recv() {
            self.process_event(event, now);
        }
    }

    pub fn process_event(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::Info(message) => {
                tracing::info!("{message}");
                self.state.status = message;
            }
            UiEvent::Error(err) => {
                tracing::error!(category = ?err.category(), context = ?err.context(), "{}", err.message());
                self.state.status = format!("{} error: {}", err_label(err.category()), err.message());
                self.notifications
                    .alert(self.state.status.clone(), NotificationKind::Error, now);
            }
            UiEvent::OperationSettled {
                operation,
                request_id,
                outcome,
            } => self.settle(operation, request_id, outcome, now),
        }
    }

    pub fn prune_notifications(&mut self, now: Instant) {
        self.notifications.prune(now);
    }

    fn allocate_request_id(&mut self) -> RequestId {
        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;
        id
    }

    fn reject(&mut self, operation: Operation, err: ValidationError, now: Instant) {
        let ui_err = UiError::from_validation(operation.into(), err);
        tracing::debug!(operation = operation.as_str(), reason = ui_err.message(), "input rejected locally");
        if let Some(field) = err.focus_target() {
            self.state.request_focus(field);
        }
        self.notifications
            .alert(ui_err.message(), NotificationKind::Error, now);
    }

    fn dispatch(
        &mut self,
        operation: Operation,
        now: Instant,
        build: impl FnOnce(RequestId) -> BackendCommand,
    ) {
        let request_id = self.allocate_request_id();
        self.state.slot_mut(operation).begin(request_id);
        tracing::info!(operation = operation.as_str(), %request_id, "dispatching cipher request");

        if let Err(err) = dispatch_backend_command(&self.cmd_tx, build(request_id)) {
            self.state.slot_mut(operation).settle(request_id);
            self.notify_failure(operation, &err, now);
        }
    }

    fn settle(
        &mut self,
        operation: Operation,
        request_id: RequestId,
        outcome: Result<String, UiError>,
        now: Instant,
    ) {
        if !self.state.slot_mut(operation).settle(request_id) {
            tracing::warn!(operation = operation.as_str(), %request_id, "ignoring settlement for unknown request");
            return;
        }

        let output = match outcome {
            Ok(output) => output,
            Err(err) => {
                self.notify_failure(operation, &err, now);
                return;
            }
        };

        if !self.state.slot_mut(operation).claim_render(request_id) {
            tracing::debug!(
                operation = operation.as_str(),
                %request_id,
                "discarding result superseded by a newer request"
            );
            return;
        }
        self.state.panel_mut(operation).reveal(output);

        match operation {
            Operation::Encrypt => {
                let emojis = self.state.encrypted_output.text().to_string();
                if let Err(err) = self.clipboard.write_text(&emojis) {
                    tracing::warn!(%request_id, error = %err, "could not copy ciphertext to clipboard");
                }
                self.notifications.alert(
                    "Message encrypted and copied to clipboard!",
                    NotificationKind::Success,
                    now,
                );
            }
            Operation::Decrypt => {
                self.notifications.alert(
                    "Message decrypted successfully!",
                    NotificationKind::Success,
                    now,
                );
            }
        }
    }

    fn notify_failure(&mut self, operation: Operation, err: &UiError, now: Instant) {
        tracing::warn!(
            operation = operation.as_str(),
            category = ?err.category(),
            "{} failed: {}",
            operation,
            err.message()
        );
        self.notifications.alert(
            format!("{}: {}", operation.default_failure_reason(), err.message()),
            NotificationKind::Error,
            now,
        );
    }

    fn assess_key(&mut self, role: KeyRole, now: Instant) {
        let indicator = match assess_key_format(self.state.key_input(role)) {
            KeyFormat::Blank => return,
            KeyFormat::Plausible => KeyIndicator::Valid,
            KeyFormat::Suspicious => KeyIndicator::Invalid,
        };
        self.state.set_key_indicator(role, indicator);
        if indicator == KeyIndicator::Invalid {
            self.notifications
                .alert_once(key_format_warning(role), NotificationKind::Error, now);
        }
    }

    fn copy_panel(&mut self, operation: Operation, confirmation: &str, now: Instant) {
        let text = self.state.panel(operation).text().to_string();
        if text.is_empty() {
            return;
        }
        match self.clipboard.write_text(&text) {
            Ok(()) => {
                self.notifications
                    .toast(confirmation, NotificationKind::Success, now);
            }
            Err(err) => {
                let err = UiError::from_clipboard(&err);
                tracing::warn!(context = ?UiErrorContext::Clipboard, "copy failed: {}", err.message());
                self.notifications.toast(
                    format!("Failed to copy: {}", err.message()),
                    NotificationKind::Error,
                    now,
                );
            }
        }
    }

    fn clear_panel(&mut self, operation: Operation, confirmation: &str, now: Instant) {
        self.state.panel_mut(operation).clear();
        self.notifications
            .toast(confirmation, NotificationKind::Success, now);
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
