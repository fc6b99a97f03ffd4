//! Conversion of matched elements into values.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use roxmltree::Node;

use crate::error::Result;
use crate::value::Value;

/// Coercion applied to an element's text (`None` when it has none).
pub type TextCastFn = Arc<dyn Fn(Option<&str>) -> std::result::Result<Value, String> + Send + Sync>;

/// Callback applied to the element itself.
pub type NodeCastFn =
    Arc<dyn Fn(Node<'_, '_>) -> std::result::Result<Value, String> + Send + Sync>;

/// Anything that can decode a value from an element.
///
/// Implemented by [`crate::Field`] and [`crate::Schema`], which is what lets
/// a field delegate each matched element to a nested field or schema.
pub trait Load: fmt::Debug + Send + Sync {
    /// Decode a value using `node` as the root.
    fn load_node(&self, node: Node<'_, '_>) -> Result<Value>;
}

/// How a field turns each matched element into a value.
///
/// Chosen once when the field is built and never re-inspected.
#[derive(Clone)]
pub enum Cast {
    /// Coerce the element's text.
    Primitive(TextCastFn),
    /// Hand the element to a callback.
    Callback(NodeCastFn),
    /// Load a nested field or schema with the element as root.
    Delegate(Arc<dyn Load>),
}

impl Cast {
    /// Keep the text verbatim; an element without text becomes `Value::Null`.
    #[must_use]
    pub fn string() -> Self {
        Self::text(|text| Ok(text.map_or(Value::Null, Value::from)))
    }

    /// Parse the trimmed text as a 64-bit integer.
    #[must_use]
    pub fn int() -> Self {
        Self::text(|text| {
            let text = require_text(text)?;
            text.parse::<i64>()
                .map(Value::Int)
                .map_err(|e| format!("'{text}' is not an integer: {e}"))
        })
    }

    /// Parse the trimmed text as a float.
    #[must_use]
    pub fn float() -> Self {
        Self::text(|text| {
            let text = require_text(text)?;
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|e| format!("'{text}' is not a float: {e}"))
        })
    }

    /// Parse the trimmed text as a datetime with a `chrono` format string.
    #[must_use]
    pub fn datetime(format: impl Into<String>) -> Self {
        let format = format.into();
        Self::text(move |text| {
            let text = require_text(text)?;
            NaiveDateTime::parse_from_str(text, &format)
                .map(Value::DateTime)
                .map_err(|e| format!("'{text}' does not match '{format}': {e}"))
        })
    }

    /// Custom text coercion.
    pub fn text<F>(f: F) -> Self
    where
        F: Fn(Option<&str>) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self::Primitive(Arc::new(f))
    }

    /// Custom element callback, with access to attributes and children.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(Node<'_, '_>) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }

    /// Delegate to a nested loader.
    pub fn delegate(loader: impl Load + 'static) -> Self {
        Self::Delegate(Arc::new(loader))
    }
}

impl Default for Cast {
    fn default() -> Self {
        Self::string()
    }
}

impl fmt::Debug for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(_) => f.write_str("Primitive(..)"),
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Delegate(inner) => f.debug_tuple("Delegate").field(inner).finish(),
        }
    }
}

fn require_text(text: Option<&str>) -> std::result::Result<&str, String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "element has no text".to_string())
}
