//! UI state owned by the workflow controller.

use std::collections::BTreeSet;

use shared::domain::{Operation, RequestId};

use crate::controller::validation::KeyRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    Message,
    PublicKey,
    Emojis,
    PrivateKey,
}

/// Border tint of a key field; purely visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyIndicator {
    #[default]
    Neutral,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPanel {
    text: String,
    visible: bool,
}

impl ResultPanel {
    pub fn reveal(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.visible = true;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.visible = false;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// In-flight bookkeeping for one operation.
#[derive(Debug, Clone, Default)]
pub struct OperationSlot {
    in_flight: BTreeSet<RequestId>,
    rendered: Option<RequestId>,
}

impl OperationSlot {
    pub fn begin(&mut self, request_id: RequestId) {
        self.in_flight.insert(request_id);
    }

    /// Returns `false` if the request was not in flight.
    pub fn settle(&mut self, request_id: RequestId) -> bool {
        self.in_flight.remove(&request_id)
    }

    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Claims the result panel for `request_id` unless a newer request
    /// already rendered into it.
    pub fn claim_render(&mut self, request_id: RequestId) -> bool {
        if self.rendered.is_some_and(|rendered| rendered > request_id) {
            return false;
        }
        self.rendered = Some(request_id);
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub message_input: String,
    pub public_key_input: String,
    pub emojis_input: String,
    pub private_key_input: String,
    pub public_key_indicator: KeyIndicator,
    pub private_key_indicator: KeyIndicator,
    pub encrypt: OperationSlot,
    pub decrypt: OperationSlot,
    pub encrypted_output: ResultPanel,
    pub decrypted_output: ResultPanel,
    pub status: String,
    focus_request: Option<InputField>,
}

impl WorkflowState {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn slot(&self, operation: Operation) -> &OperationSlot {
        match operation {
            Operation::Encrypt => &self.encrypt,
            Operation::Decrypt => &self.decrypt,
        }
    }

    pub fn slot_mut(&mut self, operation: Operation) -> &mut OperationSlot {
        match operation {
            Operation::Encrypt => &mut self.encrypt,
            Operation::Decrypt => &mut self.decrypt,
        }
    }

    pub fn panel(&self, operation: Operation) -> &ResultPanel {
        match operation {
            Operation::Encrypt => &self.encrypted_output,
            Operation::Decrypt => &self.decrypted_output,
        }
    }

    pub fn panel_mut(&mut self, operation: Operation) -> &mut ResultPanel {
        match operation {
            Operation::Encrypt => &mut self.encrypted_output,
            Operation::Decrypt => &mut self.decrypted_output,
        }
    }

    pub fn key_input(&self, role: KeyRole) -> &str {
        match role {
            KeyRole::Public => &self.public_key_input,
            KeyRole::Private => &self.private_key_input,
        }
    }

    pub fn key_indicator(&self, role: KeyRole) -> KeyIndicator {
        match role {
            KeyRole::Public => self.public_key_indicator,
            KeyRole::Private => self.private_key_indicator,
        }
    }

    pub fn set_key_indicator(&mut self, role: KeyRole, indicator: KeyIndicator) {
        match role {
            KeyRole::Public => self.public_key_indicator = indicator,
            KeyRole::Private => self.private_key_indicator = indicator,
        }
    }

    pub fn is_busy(&self, operation: Operation) -> bool {
        self.slot(operation).is_busy()
    }

    pub fn button_label(&self, operation: Operation) -> &'static str {
        match (operation, self.is_busy(operation)) {
            (_, true) => "Processing...",
            (Operation::Encrypt, false) => "Encrypt to Emojis",
            (Operation::Decrypt, false) => "Decrypt Message",
        }
    }

    pub fn request_focus(&mut self, field: InputField) {
        self.focus_request = Some(field);
    }

    pub fn focus_request(&self) -> Option<InputField> {
        self.focus_request
    }

    /// Hands the pending focus request to the view exactly once.
    pub fn take_focus_request(&mut self) -> Option<InputField> {
        self.focus_request.take()
    }
}
