//! Schema runtime that orchestrates field extraction.

use std::sync::Arc;

use roxmltree::Node;

use super::core::SchemaType;
use super::output::OutputContainer;
use crate::config::SchemaOptions;
use crate::error::{DecodeError, Result};
use crate::field::{Load, Resolution};
use crate::value::{Context, Record, Value};
use crate::xml::{get_tag_name, parse_document};

/// Input accepted by [`Schema::load`]: raw XML text or an element.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a, 'input> {
    /// XML text, parsed before loading. Namespaces are not stripped.
    Text(&'a str),
    /// An already parsed element used as root.
    Node(Node<'a, 'input>),
}

impl<'a> From<&'a str> for Input<'a, 'a> {
    fn from(text: &'a str) -> Self {
        Input::Text(text)
    }
}

impl<'a> From<&'a String> for Input<'a, 'a> {
    fn from(text: &'a String) -> Self {
        Input::Text(text.as_str())
    }
}

impl<'a, 'input> From<Node<'a, 'input>> for Input<'a, 'input> {
    fn from(node: Node<'a, 'input>) -> Self {
        Input::Node(node)
    }
}

/// A schema type together with per-use options.
///
/// The field registry is shared with the schema type; loading never mutates
/// it, so one schema can serve any number of loads.
///
/// # Examples
/// ```
/// use treeschema::{Field, Schema, SchemaType, Value};
///
/// let cd = SchemaType::builder("CD")
///     .field("title", Field::new("CD/TITLE"))
///     .field("price", Field::float("CD/PRICE"))
///     .field("missing", Field::new("CD/NOPE").default("n/a"))
///     .build()
///     .unwrap();
///
/// let xml = "<CATALOG><CD><TITLE>Empire Burlesque</TITLE><PRICE>10.90</PRICE></CD></CATALOG>";
/// let data = Schema::new(cd).load(xml).unwrap();
/// assert_eq!(data["title"], Value::from("Empire Burlesque"));
/// assert_eq!(data["price"], Value::Float(10.90));
/// assert_eq!(data["missing"], Value::from("n/a"));
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    schema_type: Arc<SchemaType>,
    options: SchemaOptions,
}

impl Schema {
    /// Create a schema with default options.
    #[must_use]
    pub fn new(schema_type: Arc<SchemaType>) -> Self {
        Self::with_options(schema_type, SchemaOptions::default())
    }

    /// Create a schema with the given options.
    #[must_use]
    pub fn with_options(schema_type: Arc<SchemaType>, options: SchemaOptions) -> Self {
        Self {
            schema_type,
            options,
        }
    }

    /// Set the missing-field policy.
    #[must_use]
    pub fn ignore_missing(mut self, ignore_missing: bool) -> Self {
        self.options.ignore_missing = ignore_missing;
        self
    }

    /// Replace the context handed to the post-load hook.
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.options.context = context;
        self
    }

    /// The underlying schema type.
    #[must_use]
    pub fn schema_type(&self) -> &Arc<SchemaType> {
        &self.schema_type
    }

    /// The options of this schema.
    #[must_use]
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Load a record from XML text or an element.
    ///
    /// # Errors
    /// Returns `DecodeError::Parse` for malformed text, `MissingField` for a
    /// missing field that is not suppressed, `Cast` for failed conversions
    /// and `Validation` for a post-load hook that returns a non-object.
    pub fn load<'a, 'input: 'a>(&self, input: impl Into<Input<'a, 'input>>) -> Result<Record> {
        match input.into() {
            Input::Text(text) => {
                let doc = parse_document(text)?;
                self.load_element(doc.root_element())
            }
            Input::Node(node) => self.load_element(node),
        }
    }

    /// Load into another output container, such as a JSON map.
    ///
    /// # Errors
    /// Same as [`Schema::load`], plus any conversion error of the container.
    pub fn load_as<'a, 'input: 'a, C: OutputContainer>(
        &self,
        input: impl Into<Input<'a, 'input>>,
    ) -> Result<C> {
        C::from_record(self.load(input)?)
    }

    /// Load a record using `root` as the root element.
    ///
    /// Fields are evaluated in registry order. The first error that is not a
    /// suppressed missing field aborts the load.
    ///
    /// # Errors
    /// See [`Schema::load`].
    pub fn load_element(&self, root: Node<'_, '_>) -> Result<Record> {
        if !(root.is_element() || root.is_root()) {
            return Err(DecodeError::validation(format!(
                "Schema '{}' can only load from an element",
                self.schema_type.name()
            )));
        }

        let name = self.schema_type.name();
        tracing::debug!(
            schema = %name,
            root = %get_tag_name(root),
            fields = self.schema_type.len(),
            "Loading schema"
        );

        let mut data = Record::with_capacity(self.schema_type.len());
        for (field_name, field) in self.schema_type.fields() {
            match field.resolve(root)? {
                Resolution::Found(value) => {
                    data.insert(field_name.to_string(), value);
                }
                Resolution::Missing(err) => {
                    if self.options.ignore_missing && !field.required().is_required() {
                        tracing::debug!(
                            schema = %name,
                            field = %field_name,
                            error = %err,
                            "Suppressing missing field"
                        );
                        continue;
                    }
                    return Err(err);
                }
            }
        }

        let data = self.schema_type.post_load(data, &self.options.context)?;
        tracing::debug!(schema = %name, loaded = data.len(), "Loaded schema");
        Ok(data)
    }
}

impl From<Arc<SchemaType>> for Schema {
    fn from(schema_type: Arc<SchemaType>) -> Self {
        Self::new(schema_type)
    }
}

impl From<&Arc<SchemaType>> for Schema {
    fn from(schema_type: &Arc<SchemaType>) -> Self {
        Self::new(Arc::clone(schema_type))
    }
}

impl Load for Schema {
    fn load_node(&self, node: Node<'_, '_>) -> Result<Value> {
        self.load_element(node).map(Value::Object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::field::Field;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    const CATALOG: &str = r#"<CATALOG>
  <CD id="7"><TITLE>Empire Burlesque</TITLE><PRICE>10.90</PRICE></CD>
</CATALOG>"#;

    fn schema(ignore_missing: bool, required: Option<bool>) -> Schema {
        let mut nope = Field::new("CD/NOPE");
        if let Some(required) = required {
            nope = nope.required(required);
        }
        let schema_type = SchemaType::builder("Catalog")
            .field("title", Field::new("CD/TITLE"))
            .field("nope", nope)
            .field("price", Field::float("CD/PRICE"))
            .build()
            .unwrap();
        Schema::new(schema_type).ignore_missing(ignore_missing)
    }

    #[test]
    fn test_missing_aborts_by_default() {
        let err = schema(false, None).load(CATALOG).unwrap_err();
        assert_eq!(err, DecodeError::missing("CD/NOPE"));
    }

    #[test]
    fn test_ignore_missing_suppresses_unset_and_optional() {
        for required in [None, Some(false)] {
            let data = schema(true, required).load(CATALOG).unwrap();
            assert_eq!(
                data.keys().map(String::as_str).collect::<Vec<_>>(),
                ["title", "price"]
            );
        }
    }

    #[test]
    fn test_required_overrides_ignore_missing() {
        let err = schema(true, Some(true)).load(CATALOG).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_cast_errors_are_never_suppressed() {
        let schema_type = SchemaType::builder("Broken")
            .field("title", Field::int("CD/TITLE"))
            .build()
            .unwrap();
        let err = Schema::new(schema_type)
            .ignore_missing(true)
            .load(CATALOG)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Cast { .. }));
    }

    #[test]
    fn test_non_missing_default_errors_are_never_suppressed() {
        let schema_type = SchemaType::builder("Strict")
            .field("bonus", Field::new("CD/BONUS").raise(ErrorKind::Validation))
            .build()
            .unwrap();
        let err = Schema::new(schema_type)
            .ignore_missing(true)
            .load(CATALOG)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Validation(_)));
    }

    #[test]
    fn test_parse_error_is_fatal() {
        let err = schema(true, None).load("<CATALOG>").unwrap_err();
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn test_load_from_node() {
        let doc = Document::parse(CATALOG).unwrap();
        let data = schema(true, None).load(doc.root_element()).unwrap();
        assert_eq!(data["title"], Value::from("Empire Burlesque"));
    }

    #[test]
    fn test_load_rejects_text_node() {
        let doc = Document::parse("<a>text</a>").unwrap();
        let text = doc.root_element().first_child().unwrap();
        let err = schema(true, None).load(text).unwrap_err();
        assert!(matches!(err, DecodeError::Validation(_)));
    }

    #[test]
    fn test_post_load_receives_context() {
        let schema_type = SchemaType::builder("Tagged")
            .field("title", Field::new("CD/TITLE"))
            .post_load(|mut data, context| {
                if let Some(source) = context.get("source") {
                    data.insert("source".to_string(), source.clone());
                }
                Ok(Value::Object(data))
            })
            .build()
            .unwrap();

        let mut context = Context::new();
        context.insert("source".to_string(), Value::from("fixture"));
        let data = Schema::new(schema_type).context(context).load(CATALOG).unwrap();

        assert_eq!(data["source"], Value::from("fixture"));
        assert_eq!(
            data.keys().map(String::as_str).collect::<Vec<_>>(),
            ["title", "source"]
        );
    }

    #[test]
    fn test_post_load_errors_abort() {
        let schema_type = SchemaType::builder("Checked")
            .field("price", Field::float("CD/PRICE"))
            .post_load(|data, _| match data.get("price").and_then(Value::as_float) {
                Some(price) if price > 5.0 => Err(DecodeError::validation("too expensive")),
                _ => Ok(Value::Object(data)),
            })
            .build()
            .unwrap();

        let err = Schema::new(schema_type).load(CATALOG).unwrap_err();
        assert_eq!(err, DecodeError::validation("too expensive"));
    }

    #[test]
    fn test_post_load_non_object_is_validation_error() {
        let schema_type = SchemaType::builder("Scalar")
            .field("title", Field::new("CD/TITLE"))
            .post_load(|_, _| Ok(Value::from("not a mapping")))
            .build()
            .unwrap();

        let err = Schema::new(schema_type).load(CATALOG).unwrap_err();
        assert!(matches!(err, DecodeError::Validation(_)));
    }

    #[test]
    fn test_load_as_json_map() {
        let map: serde_json::Map<String, serde_json::Value> =
            schema(true, None).load_as(CATALOG).unwrap();
        assert_eq!(
            serde_json::Value::Object(map),
            serde_json::json!({"title": "Empire Burlesque", "price": 10.9})
        );
    }

    #[test]
    fn test_nested_many_scenario() {
        let cd = SchemaType::builder("CD")
            .field("title", Field::new("TITLE"))
            .field("price", Field::float("PRICE"))
            .build()
            .unwrap();
        let outer = SchemaType::builder("Outer")
            .field("catalog", Field::nested("CATALOG/CD", cd).many(true))
            .build()
            .unwrap();

        let xml = r#"<root><CATALOG>
  <CD><TITLE>A</TITLE><PRICE>1.5</PRICE></CD>
  <CD><TITLE>B</TITLE><PRICE>2</PRICE></CD>
  <CD><TITLE>C</TITLE><PRICE>3.25</PRICE></CD>
</CATALOG></root>"#;
        let data = Schema::new(outer).load(xml).unwrap();
        let catalog = data["catalog"].as_array().unwrap();

        assert_eq!(catalog.len(), 3);
        let titles: Vec<_> = catalog
            .iter()
            .map(|cd| cd.as_object().unwrap()["title"].clone())
            .collect();
        assert_eq!(titles, [Value::from("A"), Value::from("B"), Value::from("C")]);
        assert_eq!(catalog[2].as_object().unwrap()["price"], Value::Float(3.25));
    }

    #[test]
    fn test_attribute_scenario() {
        let schema_type = SchemaType::builder("Ids")
            .field("id", Field::attribute("CD").attr("id"))
            .build()
            .unwrap();

        let data = Schema::new(Arc::clone(&schema_type)).load(CATALOG).unwrap();
        assert_eq!(data["id"], Value::from("7"));

        let without_id = "<CATALOG><CD><TITLE>x</TITLE></CD></CATALOG>";
        let err = Schema::new(Arc::clone(&schema_type))
            .load(without_id)
            .unwrap_err();
        assert!(err.is_missing());

        let data = Schema::new(schema_type)
            .ignore_missing(true)
            .load(without_id)
            .unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_schema_is_reusable() {
        let schema = schema(true, None);
        let first = schema.load(CATALOG).unwrap();
        let second = schema
            .load("<CATALOG><CD><TITLE>Other</TITLE><PRICE>1</PRICE></CD></CATALOG>")
            .unwrap();
        assert_eq!(first["title"], Value::from("Empire Burlesque"));
        assert_eq!(second["title"], Value::from("Other"));
        assert_eq!(second["price"], Value::Float(1.0));
    }
}
