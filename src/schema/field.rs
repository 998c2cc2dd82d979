//! Field definitions: ids, types and per-field options.

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::registry::{DEFAULT_ANALYZER, RAW_ANALYZER};
use crate::error::{JpcError, Result};

/// Sequential field id, assigned from 0 in declaration order.
pub type FieldId = u32;

/// Text field flavor as sent by clients in `builder.add_text_field`.
///
/// `1` is STRING (the whole value is one untokenized term), `2` is TEXT
/// (tokenized with the requested analyzer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextKind {
    /// Untokenized, indexed as a single term.
    String,
    /// Tokenized full text.
    Text,
}

impl TextKind {
    /// Decode the numeric type code.
    pub fn from_code(code: u64) -> Result<Self> {
        match code {
            1 => Ok(TextKind::String),
            2 => Ok(TextKind::Text),
            other => Err(JpcError::schema(format!(
                "field type must be either 1 or 2 for STRING or TEXT, got {other}"
            ))),
        }
    }
}

/// The value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// UTF-8 text.
    Text,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 64-bit integer.
    U64,
    /// 64-bit float.
    F64,
    /// UTC timestamp.
    Date,
}

impl FieldType {
    /// Name used in error messages and schema dumps.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::I64 => "i64",
            FieldType::U64 => "u64",
            FieldType::F64 => "f64",
            FieldType::Date => "date",
        }
    }
}

/// Options shared by every field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Values are kept and returned with hits.
    pub stored: bool,
    /// Values are added to the inverted index.
    pub indexed: bool,
    /// Analyzer name used for indexing and query terms.
    pub tokenizer: String,
}

impl FieldOptions {
    /// Options for a text field of the given kind.
    pub fn text(kind: TextKind, stored: bool, indexed: bool, tokenizer: Option<&str>) -> Self {
        let tokenizer = match kind {
            TextKind::String => RAW_ANALYZER,
            TextKind::Text => tokenizer.unwrap_or(DEFAULT_ANALYZER),
        };

        FieldOptions {
            stored,
            indexed,
            tokenizer: tokenizer.to_string(),
        }
    }

    /// Options for a numeric or date field. These are always indexed raw.
    pub fn numeric(stored: bool, indexed: bool) -> Self {
        FieldOptions {
            stored,
            indexed,
            tokenizer: RAW_ANALYZER.to_string(),
        }
    }
}

/// A named, typed field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    options: FieldOptions,
}

impl FieldEntry {
    /// Create a new field entry.
    pub fn new<S: Into<String>>(name: S, field_type: FieldType, options: FieldOptions) -> Self {
        FieldEntry {
            name: name.into(),
            field_type,
            options,
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field value type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Field options.
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Whether values are stored.
    pub fn is_stored(&self) -> bool {
        self.options.stored
    }

    /// Whether values are indexed.
    pub fn is_indexed(&self) -> bool {
        self.options.indexed
    }

    /// Whether this is a tokenized text field.
    pub fn is_text(&self) -> bool {
        self.field_type == FieldType::Text
    }

    /// Analyzer name for this field.
    pub fn tokenizer(&self) -> &str {
        &self.options.tokenizer
    }
}
