//! Schema types: the ordered field registry and its inheritance rules.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::validate_field_name;
use crate::error::{DecodeError, Result};
use crate::field::{Field, FieldBuilder};
use crate::value::{Context, Record, Value};

/// Hook run on the assembled record; must return `Value::Object`.
pub type PostLoadFn = Arc<dyn Fn(Record, &Context) -> Result<Value> + Send + Sync>;

/// Ordered mapping from field name to descriptor.
pub type Registry = IndexMap<String, Arc<Field>>;

/// Merge `declared` into `registry`.
///
/// A name that already exists keeps its position and gets the new
/// descriptor. New names are appended in declaration order.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use treeschema::schema::{merge_registry, Registry};
/// use treeschema::Field;
///
/// let field = |p: &str| Arc::new(Field::new(p).build().unwrap());
/// let mut registry = Registry::new();
/// merge_registry(&mut registry, [("a".to_string(), field("A")), ("b".to_string(), field("B"))]);
/// merge_registry(&mut registry, [("c".to_string(), field("C")), ("a".to_string(), field("X"))]);
///
/// let names: Vec<_> = registry.keys().map(String::as_str).collect();
/// assert_eq!(names, ["a", "b", "c"]);
/// assert_eq!(registry["a"].path(), "X");
/// ```
pub fn merge_registry(
    registry: &mut Registry,
    declared: impl IntoIterator<Item = (String, Arc<Field>)>,
) {
    for (name, field) in declared {
        registry.insert(name, field);
    }
}

/// A schema type: a named, immutable set of fields plus a post-load hook.
///
/// Built once with [`SchemaType::builder`] and shared by reference between
/// every [`crate::Schema`] that uses it.
pub struct SchemaType {
    name: String,
    fields: Registry,
    post_load: Option<PostLoadFn>,
}

impl SchemaType {
    /// Start defining a schema type.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            bases: Vec::new(),
            declared: Vec::new(),
            post_load: None,
        }
    }

    /// The schema type's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field registry, in evaluation order.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.fields
    }

    /// Iterate over fields in evaluation order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields
            .iter()
            .map(|(name, field)| (name.as_str(), Arc::as_ref(field)))
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name).map(Arc::as_ref)
    }

    /// Field names in evaluation order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Run the post-load hook, checking that it returns an object.
    ///
    /// # Errors
    /// Returns whatever the hook returns, or `DecodeError::Validation` if the
    /// hook produced something other than an object.
    pub fn post_load(&self, data: Record, context: &Context) -> Result<Record> {
        let Some(hook) = &self.post_load else {
            return Ok(data);
        };

        match hook(data, context)? {
            Value::Object(record) => Ok(record),
            other => Err(DecodeError::validation(format!(
                "post_load of schema '{}' returned {}, expected an object",
                self.name,
                other.type_name()
            ))),
        }
    }
}

impl fmt::Debug for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaType")
            .field("name", &self.name)
            .field("fields", &self.field_names())
            .field("has_post_load", &self.post_load.is_some())
            .finish()
    }
}

/// Builder for [`SchemaType`].
pub struct SchemaBuilder {
    name: String,
    bases: Vec<Arc<SchemaType>>,
    declared: Vec<(String, FieldBuilder)>,
    post_load: Option<PostLoadFn>,
}

impl SchemaBuilder {
    /// Inherit the fields (and post-load hook) of `base`.
    ///
    /// May be called more than once; bases are merged in call order.
    #[must_use]
    pub fn extends(mut self, base: &Arc<SchemaType>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Declare a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: FieldBuilder) -> Self {
        self.declared.push((name.into(), field));
        self
    }

    /// Set the post-load hook, replacing any inherited one.
    #[must_use]
    pub fn post_load<F>(mut self, hook: F) -> Self
    where
        F: Fn(Record, &Context) -> Result<Value> + Send + Sync + 'static,
    {
        self.post_load = Some(Arc::new(hook));
        self
    }

    /// Validate the declarations and build the schema type.
    ///
    /// # Errors
    /// Returns `DecodeError::Validation` if a field name is not an identifier
    /// or a field is misconfigured.
    pub fn build(self) -> Result<Arc<SchemaType>> {
        if self.name.trim().is_empty() {
            return Err(DecodeError::validation("Schema name must not be empty"));
        }

        let mut fields = Registry::new();
        let mut post_load = None;
        for base in &self.bases {
            merge_registry(
                &mut fields,
                base.fields
                    .iter()
                    .map(|(name, field)| (name.clone(), Arc::clone(field))),
            );
            if base.post_load.is_some() {
                post_load.clone_from(&base.post_load);
            }
        }

        let mut local = Registry::new();
        for (field_name, builder) in self.declared {
            validate_field_name(&field_name)
                .map_err(|e| field_error(&self.name, &field_name, e))?;
            let field = builder
                .build()
                .map_err(|e| field_error(&self.name, &field_name, e))?;
            local.insert(field_name, Arc::new(field));
        }
        merge_registry(&mut fields, local);

        if self.post_load.is_some() {
            post_load = self.post_load;
        }

        tracing::debug!(
            schema = %self.name,
            bases = self.bases.len(),
            fields = fields.len(),
            "Defined schema type"
        );

        Ok(Arc::new(SchemaType {
            name: self.name,
            fields,
            post_load,
        }))
    }
}

/// Prefix a validation error with the field and schema it came from.
fn field_error(schema: &str, field_name: &str, err: DecodeError) -> DecodeError {
    match err {
        DecodeError::Validation(message) => DecodeError::validation(format!(
            "Field '{field_name}' of schema '{schema}': {message}"
        )),
        other => other,
    }
}
