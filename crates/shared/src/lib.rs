//! Wire contract shared by the cipher client and the desktop workflow.

pub mod domain;
pub mod error;
pub mod protocol;
