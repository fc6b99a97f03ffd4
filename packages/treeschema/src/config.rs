//! Configuration constants, schema options and validation functions.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DecodeError, Result};
use crate::value::{Context, Value};

/// Text tokens that a boolean field decodes as `true`.
pub const TRUTHY_TOKENS: &[&str] = &["1", "true", "yes", "Success", "success", "SUCCESS", "ok"];

/// Text tokens that a boolean field decodes as `false`.
pub const FALSY_TOKENS: &[&str] = &["0", "false", "no", "Failure", "failure", "FAILURE", "error"];

/// Format used by datetime fields when none is given.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Field name pattern: an identifier.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FIELD_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Attribute name pattern, following XML name rules loosely.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ATTR_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][\w.-]*$").expect("valid regex"));

/// Validate a field name declared on a schema.
///
/// # Examples
/// ```
/// use treeschema::config::validate_field_name;
///
/// assert!(validate_field_name("title").is_ok());
/// assert!(validate_field_name("2fast").is_err());
/// ```
pub fn validate_field_name(name: &str) -> Result<()> {
    if FIELD_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(DecodeError::validation(format!(
            "Invalid field name: '{name}'. Expected an identifier (e.g., title)"
        )))
    }
}

/// Validate the attribute name of an attribute field.
pub fn validate_attr_name(name: &str) -> Result<()> {
    if ATTR_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(DecodeError::validation(format!(
            "Invalid attribute name: '{name}'"
        )))
    }
}

/// Per-use configuration of a schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaOptions {
    /// Suppress missing fields unless they are explicitly required.
    pub ignore_missing: bool,

    /// Side-channel values handed to post-load hooks.
    pub context: Context,
}

impl SchemaOptions {
    /// Create options with defaults: missing fields abort, empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the missing-field policy.
    #[must_use]
    pub fn with_ignore_missing(mut self, ignore_missing: bool) -> Self {
        self.ignore_missing = ignore_missing;
        self
    }

    /// Replace the context.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Add a single context entry.
    #[must_use]
    pub fn with_context_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}
