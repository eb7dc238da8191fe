//! Clipboard access behind a small trait so the controller runs headless.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ClipboardError {
    message: String,
}

impl ClipboardError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Desktop clipboard backed by `arboard`; opens a fresh handle per write.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|err| ClipboardError::new(err.to_string()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|err| ClipboardError::new(err.to_string()))
    }
}
