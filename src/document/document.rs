//! Document structure keyed by field id.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::document::field_value::FieldValue;
use crate::error::{JpcError, Result};
use crate::schema::{FieldId, FieldOptions, FieldType, Schema, TextKind};

/// A document represents a single item to be indexed.
///
/// A field may carry several values; they are kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    values: Vec<(FieldId, FieldValue)>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to a field.
    pub fn add(&mut self, field: FieldId, value: FieldValue) {
        self.values.push((field, value));
    }

    /// Append a value after checking it against the schema.
    pub fn add_checked(
        &mut self,
        schema: &Schema,
        field: FieldId,
        value: FieldValue,
    ) -> Result<()> {
        let entry = schema.get_field_entry(field)?;
        if entry.field_type() != value.field_type() {
            return Err(JpcError::document(format!(
                "field {} expects {} values, got {}",
                entry.name(),
                entry.field_type().as_str(),
                value.field_type().as_str()
            )));
        }
        self.add(field, value);
        Ok(())
    }

    /// All values of one field.
    pub fn get_all(&self, field: FieldId) -> impl Iterator<Item = &FieldValue> {
        self.values
            .iter()
            .filter(move |(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    /// First value of a field.
    pub fn get_first(&self, field: FieldId) -> Option<&FieldValue> {
        self.get_all(field).next()
    }

    /// All `(field, value)` pairs.
    pub fn field_values(&self) -> &[(FieldId, FieldValue)] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a document from a `{field: value | [values]}` JSON object.
    ///
    /// Unknown fields are added to a dynamic schema as stored fields: strings
    /// become TEXT with the default analyzer, integers `i64`, other numbers `f64`.
    pub fn from_json_object(
        schema: &mut Schema,
        object: &serde_json::Map<String, Value>,
    ) -> Result<Self> {
        let mut doc = Document::new();

        for (name, raw) in object {
            let values: Vec<&Value> = match raw {
                Value::Array(items) => items.iter().collect(),
                single => vec![single],
            };
            let Some(first) = values.first() else {
                continue;
            };

            let field = match schema.get_field(name) {
                Some(field) => field,
                None => {
                    let (field_type, options) = infer_dynamic_field(first)?;
                    schema.add_dynamic_field(name, field_type, options)?
                }
            };
            let field_type = schema.get_field_entry(field)?.field_type();

            for value in values {
                doc.add(field, FieldValue::from_json(field_type, value)?);
            }
        }

        Ok(doc)
    }

    /// Map stored fields to their names.
    pub fn to_named_doc(&self, schema: &Schema) -> NamedDocument {
        let mut named: BTreeMap<String, Vec<FieldValue>> = BTreeMap::new();
        for (field, value) in &self.values {
            if let Ok(entry) = schema.get_field_entry(*field) {
                if entry.is_stored() {
                    named
                        .entry(entry.name().to_string())
                        .or_default()
                        .push(value.clone());
                }
            }
        }
        NamedDocument(named)
    }
}

fn infer_dynamic_field(value: &Value) -> Result<(FieldType, FieldOptions)> {
    match value {
        Value::String(_) | Value::Bool(_) => Ok((
            FieldType::Text,
            FieldOptions::text(TextKind::Text, true, true, None),
        )),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            Ok((FieldType::I64, FieldOptions::numeric(true, true)))
        }
        Value::Number(_) => Ok((FieldType::F64, FieldOptions::numeric(true, true))),
        other => Err(JpcError::document(format!(
            "cannot infer a field type from {other}"
        ))),
    }
}

/// A document with field names instead of ids, as returned to clients.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NamedDocument(pub BTreeMap<String, Vec<FieldValue>>);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multi_valued_fields() {
        let mut doc = Document::new();
        doc.add(0, FieldValue::Text("a".to_string()));
        doc.add(1, FieldValue::I64(1));
        doc.add(0, FieldValue::Text("b".to_string()));

        let texts: Vec<_> = doc.get_all(0).filter_map(|v| v.as_text()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(doc.get_first(1), Some(&FieldValue::I64(1)));
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_add_checked_rejects_wrong_type() {
        let mut builder = Schema::builder();
        builder
            .add_text_field("title", TextKind::Text, true, true, None)
            .unwrap();
        let schema = builder.build();

        let mut doc = Document::new();
        assert!(doc.add_checked(&schema, 0, FieldValue::I64(3)).is_err());
        assert!(
            doc.add_checked(&schema, 0, FieldValue::Text("x".to_string()))
                .is_ok()
        );
        assert!(
            doc.add_checked(&schema, 9, FieldValue::Text("x".to_string()))
                .is_err()
        );
    }

    #[test]
    fn test_from_json_object_dynamic() {
        let mut schema = Schema::dynamic();
        let object = json!({"title": "The Old Man", "year": 1952, "tags": ["sea", "fish"]});
        let doc = Document::from_json_object(&mut schema, object.as_object().unwrap()).unwrap();

        let year = schema.get_field("year").unwrap();
        assert_eq!(schema.get_field_entry(year).unwrap().field_type(), FieldType::I64);
        assert_eq!(doc.get_all(schema.get_field("tags").unwrap()).count(), 2);

        let named = serde_json::to_value(doc.to_named_doc(&schema)).unwrap();
        assert_eq!(named["title"], json!(["The Old Man"]));
        assert_eq!(named["year"], json!([1952]));
    }

    #[test]
    fn test_from_json_object_fixed_schema_rejects_unknown() {
        let mut schema = Schema::builder().build();
        let object = json!({"title": "x"});
        assert!(Document::from_json_object(&mut schema, object.as_object().unwrap()).is_err());
    }
}
