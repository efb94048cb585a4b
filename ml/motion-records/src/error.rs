//! Error types for motion-records crate.

use thiserror::Error;

/// Errors that abort record construction.
///
/// Every variant carries the offending field name so the message alone
/// identifies what was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A field has the wrong type and cannot be coerced.
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput {
        /// Name of the offending field.
        field: String,
        /// What was expected and what was observed.
        reason: String,
    },

    /// An array or list has the wrong rank, axis size or length.
    #[error("invalid shape for `{field}`: {reason}")]
    InvalidShape {
        /// Name of the offending field.
        field: String,
        /// What was expected and what was observed.
        reason: String,
    },

    /// A required field was never supplied.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Invalid validation configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl RecordError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid shape error.
    #[must_use]
    pub fn invalid_shape(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a deserialization error.
    #[must_use]
    pub fn deserialization(reason: impl Into<String>) -> Self {
        Self::Deserialization(reason.into())
    }

    /// Returns the field this error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. }
            | Self::InvalidShape { field, .. }
            | Self::MissingField(field) => Some(field),
            Self::InvalidConfig(_) | Self::Deserialization(_) => None,
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

/// Result type for motion-records operations.
pub type Result<T> = std::result::Result<T, RecordError>;
