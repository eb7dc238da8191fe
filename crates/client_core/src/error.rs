use shared::domain::Operation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CipherClientError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Remote {
        operation: Operation,
        status: u16,
        message: String,
    },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed {operation} response: {detail}")]
    MalformedResponse {
        operation: Operation,
        detail: String,
    },
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherClientErrorKind {
    Remote,
    Transport,
    Malformed,
    Configuration,
}

impl CipherClientError {
    pub fn kind(&self) -> CipherClientErrorKind {
        match self {
            CipherClientError::Remote { .. } => CipherClientErrorKind::Remote,
            CipherClientError::Transport(_) => CipherClientErrorKind::Transport,
            CipherClientError::MalformedResponse { .. } => CipherClientErrorKind::Malformed,
            CipherClientError::InvalidServerUrl { .. } => CipherClientErrorKind::Configuration,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            CipherClientError::Remote { status, .. } => Some(*status),
            CipherClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
