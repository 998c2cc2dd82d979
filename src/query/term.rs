//! Term query.

use serde::Serialize;

use crate::schema::FieldId;

/// Matches documents containing an exact indexed term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermQuery {
    /// Field to search in.
    pub field: FieldId,
    /// Indexed term.
    pub term: String,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new<T: Into<String>>(field: FieldId, term: T) -> Self {
        TermQuery {
            field,
            term: term.into(),
        }
    }
}
