use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(RequestId);
id_newtype!(NotificationId);

/// The two remote operations exposed by the cipher service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl Operation {
    pub fn endpoint(self) -> &'static str {
        match self {
            Operation::Encrypt => "/encrypt",
            Operation::Decrypt => "/decrypt",
        }
    }

    /// Reason reported when the server rejects a request without an `error` field.
    pub fn default_failure_reason(self) -> &'static str {
        match self {
            Operation::Encrypt => "Encryption failed",
            Operation::Decrypt => "Decryption failed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
