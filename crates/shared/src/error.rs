use serde::{Deserialize, Serialize};

/// Body returned by the cipher service alongside a non-success status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parses a raw error body, tolerating empty and non-JSON payloads.
    pub fn from_bytes(raw: &[u8]) -> Self {
        serde_json::from_slice(raw).unwrap_or_default()
    }

    /// Server-supplied reason, or `default` when the body carried none.
    pub fn reason_or(&self, default: &str) -> String {
        match self.error.as_deref().map(str::trim) {
            Some(reason) if !reason.is_empty() => reason.to_string(),
            _ => default.to_string(),
        }
    }
}
