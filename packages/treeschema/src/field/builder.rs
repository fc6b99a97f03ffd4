//! Field constructors and builder.

use indexmap::IndexMap;
use roxmltree::Node;
use std::sync::Arc;

use super::cast::Cast;
use super::core::{Extractor, Field, Selector};
use super::types::{FieldDefault, Requirement};
use crate::config::{validate_attr_name, DEFAULT_DATETIME_FORMAT};
use crate::error::{DecodeError, ErrorKind, Result};
use crate::schema::Schema;
use crate::value::Value;
use crate::xml::Path;

/// Cast as configured on a builder, before nested fields are built.
#[derive(Debug, Clone)]
enum CastSource {
    Ready(Cast),
    Field(Box<FieldBuilder>),
}

/// Variant-specific part of a builder.
#[derive(Debug, Clone)]
enum Kind {
    Plain,
    First,
    Attribute(Option<String>),
    Boolean,
}

/// Builder for [`Field`].
///
/// Validation happens in [`FieldBuilder::build`], which schema builders call
/// when the schema type is defined.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    paths: Vec<String>,
    kind: Kind,
    cast: CastSource,
    default: FieldDefault,
    many: bool,
    required: Requirement,
    meta: IndexMap<String, Value>,
}

impl Field {
    /// Start building a field that casts the text of the elements at `path`.
    ///
    /// # Examples
    /// ```
    /// use treeschema::{Field, Value};
    ///
    /// let field = Field::new("CD/TITLE").build().unwrap();
    /// let doc = roxmltree::Document::parse("<C><CD><TITLE>Hi</TITLE></CD></C>").unwrap();
    /// assert_eq!(field.load(doc.root_element()).unwrap(), Value::from("Hi"));
    /// ```
    pub fn new(path: impl Into<String>) -> FieldBuilder {
        FieldBuilder::with_kind(vec![path.into()], Kind::Plain)
    }

    /// A field with alternative paths; the first path with matches is used.
    pub fn first(paths: impl IntoIterator<Item = impl Into<String>>) -> FieldBuilder {
        FieldBuilder::with_kind(paths.into_iter().map(Into::into).collect(), Kind::First)
    }

    /// A field reading an attribute of the elements at `path`.
    ///
    /// The attribute name must be set with [`FieldBuilder::attr`].
    pub fn attribute(path: impl Into<String>) -> FieldBuilder {
        FieldBuilder::with_kind(vec![path.into()], Kind::Attribute(None))
    }

    /// A field decoding text as a boolean.
    pub fn boolean(path: impl Into<String>) -> FieldBuilder {
        FieldBuilder::with_kind(vec![path.into()], Kind::Boolean)
    }

    /// A field keeping text as a string.
    pub fn string(path: impl Into<String>) -> FieldBuilder {
        Self::new(path).cast(Cast::string())
    }

    /// A field parsing text as an integer.
    pub fn int(path: impl Into<String>) -> FieldBuilder {
        Self::new(path).cast(Cast::int())
    }

    /// A field parsing text as a float.
    pub fn float(path: impl Into<String>) -> FieldBuilder {
        Self::new(path).cast(Cast::float())
    }

    /// A field parsing text as a datetime in the given `chrono` format.
    pub fn datetime(path: impl Into<String>, format: impl Into<String>) -> FieldBuilder {
        Self::new(path).cast(Cast::datetime(format))
    }

    /// A datetime field using [`DEFAULT_DATETIME_FORMAT`].
    pub fn iso_datetime(path: impl Into<String>) -> FieldBuilder {
        Self::datetime(path, DEFAULT_DATETIME_FORMAT)
    }

    /// A sequence field loading `inner` relative to each element at `path`.
    pub fn list(path: impl Into<String>, inner: FieldBuilder) -> FieldBuilder {
        let mut builder = Self::new(path).many(true);
        builder.cast = CastSource::Field(Box::new(inner));
        builder
    }

    /// A field loading `schema` with each element at `path` as root.
    pub fn nested(path: impl Into<String>, schema: impl Into<Schema>) -> FieldBuilder {
        Self::new(path).cast(Cast::delegate(schema.into()))
    }
}

impl FieldBuilder {
    fn with_kind(paths: Vec<String>, kind: Kind) -> Self {
        Self {
            paths,
            kind,
            cast: CastSource::Ready(Cast::default()),
            default: FieldDefault::default(),
            many: false,
            required: Requirement::Unset,
            meta: IndexMap::new(),
        }
    }

    /// Set the cast.
    #[must_use]
    pub fn cast(mut self, cast: Cast) -> Self {
        self.cast = CastSource::Ready(cast);
        self
    }

    /// Cast with a callback receiving the element itself.
    #[must_use]
    pub fn callback<F>(self, f: F) -> Self
    where
        F: Fn(Node<'_, '_>) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.cast(Cast::callback(f))
    }

    /// Load this nested field relative to each matched element.
    #[must_use]
    pub fn delegate_to(mut self, inner: FieldBuilder) -> Self {
        self.cast = CastSource::Field(Box::new(inner));
        self
    }

    /// Set the attribute name of an attribute field.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>) -> Self {
        if let Kind::Attribute(attr) = &mut self.kind {
            *attr = Some(name.into());
        }
        self
    }

    /// Use `value` when nothing matches.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Call `producer` for a fresh value each time nothing matches.
    #[must_use]
    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = FieldDefault::Produce(Arc::new(producer));
        self
    }

    /// Raise exactly `error` when nothing matches.
    #[must_use]
    pub fn default_error(mut self, error: DecodeError) -> Self {
        self.default = FieldDefault::Error(error);
        self
    }

    /// Raise a fresh error of `kind` when nothing matches.
    #[must_use]
    pub fn raise(mut self, kind: ErrorKind) -> Self {
        self.default = FieldDefault::Raise(kind);
        self
    }

    /// Set the cardinality.
    #[must_use]
    pub fn many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }

    /// Set whether a miss is fatal even when the schema ignores missing fields.
    #[must_use]
    pub fn required(mut self, required: impl Into<Requirement>) -> Self {
        self.required = required.into();
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Validate the configuration and build the field.
    ///
    /// # Errors
    /// Returns `DecodeError::Validation` for malformed paths, an attribute
    /// field without an attribute name or with a non-primitive cast, or an
    /// alternative-path field without paths.
    pub fn build(self) -> Result<Field> {
        let mut paths = self
            .paths
            .iter()
            .map(|p| Path::parse(p))
            .collect::<Result<Vec<_>>>()?;

        let selector = match self.kind {
            Kind::First => {
                if paths.is_empty() {
                    return Err(DecodeError::validation(
                        "Alternative-path field requires at least one path",
                    ));
                }
                Selector::First(paths)
            }
            _ => match paths.pop() {
                Some(path) if paths.is_empty() => Selector::Single(path),
                _ => {
                    return Err(DecodeError::validation(
                        "Field requires exactly one path",
                    ))
                }
            },
        };

        let cast = match self.cast {
            CastSource::Ready(cast) => cast,
            CastSource::Field(inner) => Cast::Delegate(Arc::new(inner.build()?)),
        };

        let extractor = match self.kind {
            Kind::Plain | Kind::First => Extractor::Cast,
            Kind::Boolean => Extractor::Boolean,
            Kind::Attribute(None) => {
                return Err(DecodeError::validation(format!(
                    "Attribute field '{selector_path}' requires an attribute name",
                    selector_path = self.paths.join(" | ")
                )))
            }
            Kind::Attribute(Some(name)) => {
                validate_attr_name(&name)?;
                if !matches!(cast, Cast::Primitive(_)) {
                    return Err(DecodeError::validation(format!(
                        "Attribute field '@{name}' only supports primitive casts"
                    )));
                }
                Extractor::Attribute(name)
            }
        };

        Ok(Field {
            selector,
            extractor,
            cast,
            default: self.default,
            many: self.many,
            required: self.required,
            meta: self.meta,
        })
    }
}

impl TryFrom<FieldBuilder> for Field {
    type Error = DecodeError;

    fn try_from(builder: FieldBuilder) -> Result<Self> {
        builder.build()
    }
}
