use serde::{Deserialize, Serialize};

/// Stable error taxonomy reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed or missing input, rejected before reaching the host application.
    ValidationError,
    /// Well-formed request whose target entity does not exist.
    NotFoundError,
    /// The host application refused or failed the command.
    AutomationError,
    /// Execution or gate wait exceeded its bound.
    TimeoutError,
    /// The command succeeded but its output could not be decoded.
    SerializationError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::NotFoundError => "NotFoundError",
            ErrorKind::AutomationError => "AutomationError",
            ErrorKind::TimeoutError => "TimeoutError",
            ErrorKind::SerializationError => "SerializationError",
        }
    }
}

/// Unified error type for the bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("automation failed: {0}")]
    Automation(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("unreadable automation output: {0}")]
    Serialization(String),
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Validation(_) => ErrorKind::ValidationError,
            BridgeError::NotFound(_) => ErrorKind::NotFoundError,
            BridgeError::Automation(_) => ErrorKind::AutomationError,
            BridgeError::Timeout(_) => ErrorKind::TimeoutError,
            BridgeError::Serialization(_) => ErrorKind::SerializationError,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        BridgeError::Validation(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        BridgeError::Serialization(message.into())
    }
}

/// Result type alias using [`BridgeError`].
pub type BridgeResult<T> = Result<T, BridgeError>;
