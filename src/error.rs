use thiserror::Error;

use crate::registry::TypeTag;

#[derive(Debug, Error)]
pub enum OdbcMiddlewareError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Cannot decode value for type {tag}: {reason}")]
    DecodeError { tag: TypeTag, reason: String },

    #[error("Type registry error: {0}")]
    RegistryError(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Query timed out: {0}")]
    QueryTimeout(String),

    #[error("Database error: {0}")]
    Unclassified(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl OdbcMiddlewareError {
    pub(crate) fn decode(tag: &TypeTag, reason: impl Into<String>) -> Self {
        OdbcMiddlewareError::DecodeError {
            tag: tag.clone(),
            reason: reason.into(),
        }
    }

    /// The raw driver message for errors that came back from the database.
    #[must_use]
    pub fn database_message(&self) -> Option<&str> {
        match self {
            Self::DuplicateKey(msg) | Self::QueryTimeout(msg) | Self::Unclassified(msg) => {
                Some(msg)
            }
            _ => None,
        }
    }
}

/// Error reported by a driver collaborator.
///
/// Carries the driver's message text verbatim; classification against a dialect
/// happens in [`crate::OdbcSession::translate_error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
}

impl DriverError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for DriverError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for DriverError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
