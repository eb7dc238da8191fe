//! Backend commands queued from UI to backend worker.

use shared::{
    domain::{Operation, RequestId},
    protocol::{DecryptRequest, EncryptRequest},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Encrypt {
        request_id: RequestId,
        request: EncryptRequest,
    },
    Decrypt {
        request_id: RequestId,
        request: DecryptRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        self.operation().as_str()
    }

    pub fn operation(&self) -> Operation {
        match self {
            BackendCommand::Encrypt { .. } => Operation::Encrypt,
            BackendCommand::Decrypt { .. } => Operation::Decrypt,
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            BackendCommand::Encrypt { request_id, .. }
            | BackendCommand::Decrypt { request_id, .. } => *request_id,
        }
    }
}
