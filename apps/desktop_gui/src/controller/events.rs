//! UI/backend events, control bindings and error modeling for the workflow controller.

use client_core::{CipherClientError, CipherClientErrorKind};
use shared::domain::{Operation, RequestId};

use crate::{clipboard::ClipboardError, controller::validation::ValidationError};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    /// Exactly one per dispatched request, whatever the outcome.
    OperationSettled {
        operation: Operation,
        request_id: RequestId,
        outcome: Result<String, UiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    EncryptButton,
    DecryptButton,
    PublicKeyField,
    PrivateKeyField,
    CopyEncrypted,
    CopyDecrypted,
    ClearEncrypted,
    ClearDecrypted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlEvent {
    Click,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Remote,
    Transport,
    Clipboard,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Encrypt,
    Decrypt,
    Clipboard,
    General,
}

impl From<Operation> for UiErrorContext {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Encrypt => UiErrorContext::Encrypt,
            Operation::Decrypt => UiErrorContext::Decrypt,
        }
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Remote => "Server",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Clipboard => "Clipboard",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    /// Classifies free-form failure text, e.g. from worker startup.
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("clipboard") {
            UiErrorCategory::Clipboard
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("required")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_client_error(operation: Operation, err: &CipherClientError) -> Self {
        let category = match err.kind() {
            CipherClientErrorKind::Remote => UiErrorCategory::Remote,
            CipherClientErrorKind::Transport | CipherClientErrorKind::Malformed => {
                UiErrorCategory::Transport
            }
            CipherClientErrorKind::Configuration => UiErrorCategory::Validation,
        };
        Self::new(category, operation.into(), err.to_string())
    }

    pub fn from_validation(context: UiErrorContext, err: ValidationError) -> Self {
        Self::new(UiErrorCategory::Validation, context, err.to_string())
    }

    pub fn from_clipboard(err: &ClipboardError) -> Self {
        Self::new(
            UiErrorCategory::Clipboard,
            UiErrorContext::Clipboard,
            err.to_string(),
        )
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
