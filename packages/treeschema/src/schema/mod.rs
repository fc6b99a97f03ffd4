//! Schemas: named sets of fields loaded together into one record.
//!
//! A [`SchemaType`] is defined once through [`SchemaBuilder`], optionally
//! inheriting the fields of other schema types. A [`Schema`] pairs a schema
//! type with per-use options and performs the load.

mod core;
mod engine;
mod output;

pub use self::core::{merge_registry, PostLoadFn, Registry, SchemaBuilder, SchemaType};
pub use engine::{Input, Schema};
pub use output::OutputContainer;
