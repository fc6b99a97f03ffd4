//! Types shared by field descriptors.

use std::fmt;
use std::sync::Arc;

use crate::error::{DecodeError, ErrorKind};
use crate::value::Value;

/// Whether a field may be suppressed when the schema ignores missing fields.
///
/// `Unset` and `Optional` both defer to the schema's policy. Only
/// `Required` turns a missing field into an error regardless of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requirement {
    #[default]
    Unset,
    Optional,
    Required,
}

impl Requirement {
    /// Check if the field was explicitly marked required.
    #[must_use]
    pub fn is_required(self) -> bool {
        self == Self::Required
    }
}

impl From<bool> for Requirement {
    fn from(required: bool) -> Self {
        if required {
            Self::Required
        } else {
            Self::Optional
        }
    }
}

/// Producer for default values, invoked on every miss.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// What a field yields when its path matches nothing.
#[derive(Clone)]
pub enum FieldDefault {
    /// Raise a fresh error of this kind, naming the field's path.
    Raise(ErrorKind),
    /// Raise exactly this error.
    Error(DecodeError),
    /// Call the producer and use its result.
    Produce(DefaultFn),
    /// Use this value, including `Value::Null`.
    Value(Value),
}

impl Default for FieldDefault {
    fn default() -> Self {
        Self::Raise(ErrorKind::MissingField)
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raise(kind) => f.debug_tuple("Raise").field(kind).finish(),
            Self::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Self::Produce(_) => f.write_str("Produce(..)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Outcome of resolving a field against a node.
///
/// Hard failures are returned as `Err` by the resolving method; only a
/// missing value ends up here, so callers can decide whether to suppress it.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Value),
    Missing(DecodeError),
}

impl Resolution {
    /// Turn a missing value into an error.
    pub fn into_result(self) -> crate::Result<Value> {
        match self {
            Self::Found(value) => Ok(value),
            Self::Missing(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_from_bool() {
        assert_eq!(Requirement::from(true), Requirement::Required);
        assert_eq!(Requirement::from(false), Requirement::Optional);
        assert_eq!(Requirement::default(), Requirement::Unset);
        assert!(!Requirement::Unset.is_required());
    }

    #[test]
    fn test_default_raises_missing_field() {
        assert!(matches!(
            FieldDefault::default(),
            FieldDefault::Raise(ErrorKind::MissingField)
        ));
    }

    #[test]
    fn test_resolution_into_result() {
        assert_eq!(
            Resolution::Found(Value::Int(1)).into_result(),
            Ok(Value::Int(1))
        );
        assert!(Resolution::Missing(DecodeError::missing("x"))
            .into_result()
            .is_err());
    }
}
