//! Document module.
//!
//! Documents map field ids to lists of typed values.

#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;

pub use document::{Document, NamedDocument};
pub use field_value::FieldValue;
