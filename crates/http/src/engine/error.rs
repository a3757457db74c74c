use thiserror::Error;

use crate::engine::{MessageKind, ResourceKind};

/// Rejections reported by the message engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("failed to allocate {kind}, live allocations reached the limit {limit}")]
    AllocationFailed { kind: ResourceKind, limit: usize },

    #[error("header index {index} out of range, header count: {count}")]
    HeaderIndexOutOfRange { index: usize, count: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid request path: {reason}")]
    InvalidPath { reason: String },

    #[error("invalid response status: {0}")]
    InvalidStatus(i32),

    #[error("{field} is not set")]
    FieldNotSet { field: &'static str },

    #[error("operation requires a {expected} message")]
    WrongMessageKind { expected: MessageKind },
}

impl EngineError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_path<S: ToString>(str: S) -> Self {
        Self::InvalidPath { reason: str.to_string() }
    }

    pub fn field_not_set(field: &'static str) -> Self {
        Self::FieldNotSet { field }
    }
}
