//! XML access for field extraction.
//!
//! Wraps `roxmltree` with the operations schemas rely on: parsing text into
//! a document, resolving path expressions to elements, and reading element
//! text and attributes.

mod path;
mod utils;

pub use path::Path;
pub use utils::{
    attributes, element_children, get_attribute, get_tag_name, get_text, has_tag, parse_document,
};
