//! Field descriptor: locate elements, extract values, resolve defaults.

use indexmap::IndexMap;
use roxmltree::Node;

use super::cast::{Cast, Load};
use super::types::{FieldDefault, Requirement, Resolution};
use crate::config::{FALSY_TOKENS, TRUTHY_TOKENS};
use crate::error::{DecodeError, Result};
use crate::value::Value;
use crate::xml::{get_attribute, get_text, Path};

/// How a field selects elements.
#[derive(Debug, Clone)]
pub(crate) enum Selector {
    /// A single path; truncated to one element unless `many`.
    Single(Path),
    /// Alternatives tried in order; the first with matches wins, untruncated.
    First(Vec<Path>),
}

/// How a field reads a value from a selected element.
#[derive(Debug, Clone)]
pub(crate) enum Extractor {
    /// Apply the field's cast.
    Cast,
    /// Read an attribute, coercing it with the field's primitive cast.
    Attribute(String),
    /// Map the text onto a boolean.
    Boolean,
}

/// A declarative rule for extracting one value from an XML tree.
///
/// Fields are built with the constructors on this type, which return a
/// [`super::FieldBuilder`]. A built field is immutable and can be shared by
/// any number of schemas and loads.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) selector: Selector,
    pub(crate) extractor: Extractor,
    pub(crate) cast: Cast,
    pub(crate) default: FieldDefault,
    pub(crate) many: bool,
    pub(crate) required: Requirement,
    pub(crate) meta: IndexMap<String, Value>,
}

impl Field {
    /// Path expression(s) of this field, for diagnostics.
    #[must_use]
    pub fn path(&self) -> String {
        match &self.selector {
            Selector::Single(path) => path.to_string(),
            Selector::First(paths) => paths
                .iter()
                .map(Path::as_str)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }

    /// Whether this field yields a sequence.
    #[must_use]
    pub fn many(&self) -> bool {
        self.many
    }

    /// The field's requirement flag.
    #[must_use]
    pub fn required(&self) -> Requirement {
        self.required
    }

    /// The field's default.
    #[must_use]
    pub fn default_value(&self) -> &FieldDefault {
        &self.default
    }

    /// The field's cast.
    #[must_use]
    pub fn cast(&self) -> &Cast {
        &self.cast
    }

    /// Free-form metadata attached to this field.
    #[must_use]
    pub fn meta(&self) -> &IndexMap<String, Value> {
        &self.meta
    }

    /// Return the elements selected by this field under `root`.
    pub fn get_tags<'a, 'input>(&self, root: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        match &self.selector {
            Selector::Single(path) => {
                let mut tags = path.select(root);
                if !self.many {
                    tags.truncate(1);
                }
                tags
            }
            Selector::First(paths) => paths
                .iter()
                .map(|path| path.select(root))
                .find(|tags| !tags.is_empty())
                .unwrap_or_default(),
        }
    }

    /// Extract a value from one selected element.
    ///
    /// Returns `Ok(None)` when the element lacks the attribute an attribute
    /// field reads, which counts as a missing field.
    ///
    /// # Errors
    /// Returns `DecodeError::Cast` if a cast or callback fails, or whatever
    /// error a delegated field or schema returns.
    pub fn extract(&self, tag: Node<'_, '_>) -> Result<Option<Value>> {
        match &self.extractor {
            Extractor::Cast => self.apply_cast(tag).map(Some),
            Extractor::Attribute(name) => match get_attribute(tag, name) {
                Some(raw) => self.cast_text(Some(raw)).map(Some),
                None => Ok(None),
            },
            Extractor::Boolean => Ok(Some(Value::Bool(text_to_bool(get_text(tag))))),
        }
    }

    /// Resolve this field against `root`, keeping a miss distinct from failure.
    ///
    /// # Errors
    /// Returns an error if extraction fails on a selected element, or if the
    /// default is an error other than a missing field.
    pub fn resolve(&self, root: Node<'_, '_>) -> Result<Resolution> {
        let tags = self.get_tags(root);
        tracing::trace!(path = %self.path(), matched = tags.len(), "Selected elements");

        let mut results = Vec::with_capacity(tags.len());
        for tag in tags {
            match self.extract(tag)? {
                Some(value) => results.push(value),
                None => return Ok(Resolution::Missing(self.missing_attribute())),
            }
        }

        if results.is_empty() {
            return self.resolve_default();
        }

        if self.many {
            Ok(Resolution::Found(Value::Array(results)))
        } else {
            Ok(Resolution::Found(results.swap_remove(0)))
        }
    }

    /// Load the value of this field from `root`.
    ///
    /// # Errors
    /// Returns `DecodeError::MissingField` when nothing matched and the
    /// default raises, and any extraction error.
    pub fn load(&self, root: Node<'_, '_>) -> Result<Value> {
        self.resolve(root)?.into_result()
    }

    fn apply_cast(&self, tag: Node<'_, '_>) -> Result<Value> {
        match &self.cast {
            Cast::Delegate(inner) => inner.load_node(tag),
            Cast::Callback(callback) => {
                callback(tag).map_err(|message| DecodeError::cast(self.path(), message))
            }
            Cast::Primitive(_) => self.cast_text(get_text(tag)),
        }
    }

    fn cast_text(&self, text: Option<&str>) -> Result<Value> {
        match &self.cast {
            Cast::Primitive(coerce) => {
                coerce(text).map_err(|message| DecodeError::cast(self.path(), message))
            }
            // Builders only pair attribute reads with primitive casts
            _ => Ok(text.map_or(Value::Null, Value::from)),
        }
    }

    fn resolve_default(&self) -> Result<Resolution> {
        let error = match &self.default {
            FieldDefault::Value(value) => return Ok(Resolution::Found(value.clone())),
            FieldDefault::Produce(produce) => return Ok(Resolution::Found(produce())),
            FieldDefault::Error(err) => err.clone(),
            FieldDefault::Raise(kind) => kind.for_path(&self.path()),
        };

        if error.is_missing() {
            Ok(Resolution::Missing(error))
        } else {
            Err(error)
        }
    }

    fn missing_attribute(&self) -> DecodeError {
        match &self.extractor {
            Extractor::Attribute(name) => DecodeError::missing(format!("{}/@{name}", self.path())),
            _ => DecodeError::missing(self.path()),
        }
    }
}

impl Load for Field {
    fn load_node(&self, node: Node<'_, '_>) -> Result<Value> {
        self.load(node)
    }
}

/// Decode text as a boolean.
///
/// Known tokens map to their value; anything else is true when non-empty.
fn text_to_bool(text: Option<&str>) -> bool {
    let text = text.unwrap_or_default();
    if TRUTHY_TOKENS.contains(&text) {
        true
    } else if FALSY_TOKENS.contains(&text) {
        false
    } else {
        !text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_bool_tokens() {
        for token in ["1", "true", "yes", "Success", "success", "SUCCESS", "ok"] {
            assert!(text_to_bool(Some(token)), "{token}");
        }
        for token in ["0", "false", "no", "Failure", "failure", "FAILURE", "error"] {
            assert!(!text_to_bool(Some(token)), "{token}");
        }
    }

    #[test]
    fn test_text_to_bool_fallback() {
        assert!(text_to_bool(Some("anything")));
        assert!(text_to_bool(Some("TRUE")));
        assert!(text_to_bool(Some("No")));
        assert!(!text_to_bool(Some("")));
        assert!(!text_to_bool(None));
    }

    #[test]
    fn test_text_to_bool_compares_raw_text() {
        assert!(text_to_bool(Some("   ")));
        assert!(text_to_bool(Some(" false ")));
        assert!(text_to_bool(Some("false\n")));
    }
}
