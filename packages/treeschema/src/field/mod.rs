//! Field descriptors.
//!
//! A field locates elements with a path expression, turns each of them into
//! a value, and decides what to yield when nothing matched. Variants differ
//! in how they select (one path or alternatives) and how they extract
//! (cast, attribute read, boolean tokens).

mod builder;
mod cast;
mod core;
mod types;


pub use builder::FieldBuilder;
pub use cast::{Cast, Load, NodeCastFn, TextCastFn};
pub use self::core::Field;
pub use types::{DefaultFn, FieldDefault, Requirement, Resolution};
