//! Schema and schema builder.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::error::{JpcError, Result};
use crate::schema::field::{FieldEntry, FieldId, FieldOptions, FieldType, TextKind};

/// The ordered set of fields of an index.
///
/// Field ids are positions in declaration order. A dynamic schema accepts
/// new fields after construction; a built schema is frozen.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<FieldEntry>,
    by_name: HashMap<String, FieldId>,
    dynamic: bool,
}

impl Schema {
    /// Create an empty schema that grows as unseen fields arrive.
    pub fn dynamic() -> Self {
        Schema {
            dynamic: true,
            ..Default::default()
        }
    }

    /// Create a builder for a fixed schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Whether new fields may still be added.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Look up a field id by name.
    pub fn get_field(&self, name: &str) -> Option<FieldId> {
        self.by_name.get(name).copied()
    }

    /// Look up a field id by name, failing with a schema error.
    pub fn require_field(&self, name: &str) -> Result<FieldId> {
        self.get_field(name)
            .ok_or_else(|| JpcError::schema(format!("field {name} does not exist")))
    }

    /// Get the entry of a field id.
    pub fn get_field_entry(&self, field: FieldId) -> Result<&FieldEntry> {
        self.entries
            .get(field as usize)
            .ok_or_else(|| JpcError::schema(format!("field id {field} does not exist")))
    }

    /// Get the name of a field id.
    pub fn get_field_name(&self, field: FieldId) -> Result<&str> {
        self.get_field_entry(field).map(FieldEntry::name)
    }

    /// Number of fields.
    pub fn num_fields(&self) -> usize {
        self.entries.len()
    }

    /// Iterate `(id, entry)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &FieldEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(id, entry)| (id as FieldId, entry))
    }

    /// Ids of indexed text fields, the default search fields.
    pub fn default_search_fields(&self) -> Vec<FieldId> {
        self.fields()
            .filter(|(_, entry)| entry.is_text() && entry.is_indexed())
            .map(|(id, _)| id)
            .collect()
    }

    /// Add a field to a dynamic schema.
    pub fn add_dynamic_field(
        &mut self,
        name: &str,
        field_type: FieldType,
        options: FieldOptions,
    ) -> Result<FieldId> {
        if !self.dynamic {
            return Err(JpcError::schema(format!(
                "field {name} does not exist and the schema is not dynamic"
            )));
        }
        self.push(FieldEntry::new(name, field_type, options))
    }

    fn push(&mut self, entry: FieldEntry) -> Result<FieldId> {
        if entry.name().is_empty() {
            return Err(JpcError::schema("field name cannot be empty"));
        }
        if self.by_name.contains_key(entry.name()) {
            return Err(JpcError::schema(format!(
                "field {} already exists",
                entry.name()
            )));
        }

        let id = self.entries.len() as FieldId;
        self.by_name.insert(entry.name().to_string(), id);
        self.entries.push(entry);
        Ok(id)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Builder collecting field declarations before the schema is frozen.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a STRING or TEXT field.
    pub fn add_text_field(
        &mut self,
        name: &str,
        kind: TextKind,
        stored: bool,
        indexed: bool,
        tokenizer: Option<&str>,
    ) -> Result<FieldId> {
        let options = FieldOptions::text(kind, stored, indexed, tokenizer);
        self.schema
            .push(FieldEntry::new(name, FieldType::Text, options))
    }

    /// Add a numeric or date field.
    pub fn add_field(
        &mut self,
        name: &str,
        field_type: FieldType,
        stored: bool,
        indexed: bool,
    ) -> Result<FieldId> {
        if field_type == FieldType::Text {
            return Err(JpcError::schema("text fields are added with add_text_field"));
        }
        self.schema.push(FieldEntry::new(
            name,
            field_type,
            FieldOptions::numeric(stored, indexed),
        ))
    }

    /// Number of fields declared so far.
    pub fn num_fields(&self) -> usize {
        self.schema.num_fields()
    }

    /// Freeze the declared fields into a schema.
    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_field_ids() {
        let mut builder = Schema::builder();
        let title = builder
            .add_text_field("title", TextKind::Text, true, true, Some("en_stem"))
            .unwrap();
        let year = builder.add_field("year", FieldType::I64, true, true).unwrap();
        let schema = builder.build();

        assert_eq!(title, 0);
        assert_eq!(year, 1);
        assert_eq!(schema.num_fields(), 2);
        assert_eq!(schema.get_field("year"), Some(1));
        assert_eq!(schema.get_field_name(0).unwrap(), "title");
        assert!(!schema.is_dynamic());
    }

    #[test]
    fn test_duplicate_field_name() {
        let mut builder = SchemaBuilder::new();
        builder
            .add_text_field("title", TextKind::Text, true, true, None)
            .unwrap();
        assert!(
            builder
                .add_text_field("title", TextKind::String, true, true, None)
                .is_err()
        );
    }

    #[test]
    fn test_dynamic_schema() {
        let mut schema = Schema::dynamic();
        let id = schema
            .add_dynamic_field("body", FieldType::Text, FieldOptions::numeric(true, true))
            .unwrap();
        assert_eq!(id, 0);

        let mut frozen = Schema::builder().build();
        assert!(
            frozen
                .add_dynamic_field("body", FieldType::Text, FieldOptions::numeric(true, true))
                .is_err()
        );
    }

    #[test]
    fn test_default_search_fields() {
        let mut builder = Schema::builder();
        builder
            .add_text_field("title", TextKind::Text, true, true, None)
            .unwrap();
        builder.add_field("year", FieldType::I64, true, true).unwrap();
        builder
            .add_text_field("note", TextKind::Text, true, false, None)
            .unwrap();
        let schema = builder.build();

        assert_eq!(schema.default_search_fields(), vec![0]);
    }
}
