//! Schema module: field definitions and the schema builder.

pub mod field;
#[allow(clippy::module_inception)]
pub mod schema;

pub use field::{FieldEntry, FieldId, FieldOptions, FieldType, TextKind};
pub use schema::{Schema, SchemaBuilder};
