//! Error types for schema decoding.
//!
//! Only [`DecodeError::MissingField`] takes part in the missing-field
//! suppression policy of a schema. Every other variant aborts a load.

use thiserror::Error;

/// Main error type for the decoding library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The input document is not well-formed XML.
    #[error("XML parsing failed: {0}")]
    Parse(#[from] roxmltree::Error),

    /// A field matched no elements and had no usable default.
    #[error("Missing field: {path}")]
    MissingField { path: String },

    /// A schema or field was misconfigured.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A cast or callback failed on an element that was found.
    #[error("Cannot cast value at {path}: {message}")]
    Cast { path: String, message: String },
}

impl DecodeError {
    /// Create a missing-field error for the given path.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a cast error for the given path.
    pub fn cast(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cast {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a missing-field condition.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }
}

/// Error kinds that a field can be configured to raise when nothing matched.
///
/// The raised error carries the field's path as its diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingField,
    Validation,
    Cast,
}

impl ErrorKind {
    /// Construct a fresh error of this kind for the given field path.
    #[must_use]
    pub fn for_path(self, path: &str) -> DecodeError {
        match self {
            Self::MissingField => DecodeError::missing(path),
            Self::Validation => DecodeError::validation(format!("no value for {path}")),
            Self::Cast => DecodeError::cast(path, "no value to cast"),
        }
    }
}

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
