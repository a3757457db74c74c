use thiserror::Error;

use crate::engine::EngineError;

/// Failures of message construction and mutation.
///
/// Reads never fail with this type: an unset field or an out of range header index is
/// reported as `None`.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("engine rejected the operation: {source}")]
    Engine {
        #[from]
        source: EngineError,
    },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("{field} is not set")]
    MissingField { field: &'static str },

    #[error("http error: {source}")]
    Http {
        #[from]
        source: http::Error,
    },
}

impl MessageError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// The engine error behind this failure, if the engine rejected the operation.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Engine { source } => Some(source),
            _ => None,
        }
    }
}
