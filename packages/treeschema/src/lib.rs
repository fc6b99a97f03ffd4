//! Treeschema - Declarative decoding of XML documents into records.
//!
//! This crate maps XML documents to ordered records by describing each
//! output field as a path expression plus a cast. Schemas group fields,
//! inherit from each other, and run an optional post-load hook on the
//! assembled record.
//!
//! # Example
//!
//! ```
//! use treeschema::{Field, Schema, SchemaType, Value};
//!
//! let cd = SchemaType::builder("CD")
//!     .field("title", Field::new("CD/TITLE"))
//!     .field("year", Field::int("CD/YEAR"))
//!     .field("label", Field::new("CD/LABEL").default(Value::Null))
//!     .build()
//!     .unwrap();
//!
//! let xml = "<CATALOG><CD><TITLE>Unchain my heart</TITLE><YEAR>1987</YEAR></CD></CATALOG>";
//! let data = Schema::new(cd).load(xml).unwrap();
//! assert_eq!(data["year"], Value::Int(1987));
//! assert_eq!(data["label"], Value::Null);
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`config`]: Boolean tokens, name validation and schema options
//! - [`error`]: Error types and Result alias
//! - [`value`]: Dynamic values produced by loads
//! - [`xml`]: Document parsing and path expressions
//! - [`field`]: Field descriptors and their variants
//! - [`schema`]: Schema types, inheritance and the load runtime
//! - [`normalize`]: Namespace prefix removal

pub mod config;
pub mod error;
pub mod field;
pub mod normalize;
pub mod schema;
pub mod value;
pub mod xml;

// Re-export commonly used items
pub use config::SchemaOptions;
pub use error::{DecodeError, ErrorKind, Result};
pub use field::{Cast, Field, FieldBuilder, Requirement};
pub use normalize::remove_namespaces;
pub use schema::{Schema, SchemaType};
pub use value::{Context, Record, Value};
