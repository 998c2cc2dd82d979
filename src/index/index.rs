//! An in-RAM index: schema, committed segment and writer.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::analysis::{Analyzer, AnalyzerRegistry};
use crate::document::{Document, FieldValue};
use crate::error::{JpcError, Result};
use crate::index::inverted::{AnalyzedDocument, InvertedIndex};
use crate::index::writer::{IndexWriter, Opstamp};
use crate::schema::{FieldId, Schema};
use crate::search::Searcher;

/// Statistics about an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Live committed documents.
    pub num_docs: u32,
    /// Operations waiting for commit.
    pub pending: usize,
}

/// An index living entirely in memory.
///
/// Searchers share the committed segment; a commit while a searcher is alive
/// copies the segment first, so a searcher never observes later commits.
#[derive(Debug)]
pub struct Index {
    schema: Arc<Schema>,
    analyzers: Arc<AnalyzerRegistry>,
    committed: Arc<InvertedIndex>,
    writer: IndexWriter,
}

impl Index {
    /// Create an empty index for a schema.
    pub fn create_in_ram(schema: Schema, analyzers: Arc<AnalyzerRegistry>) -> Result<Self> {
        for (_, entry) in schema.fields() {
            if !analyzers.contains(entry.tokenizer()) {
                return Err(JpcError::schema(format!(
                    "field {} uses unknown tokenizer {}",
                    entry.name(),
                    entry.tokenizer()
                )));
            }
        }

        Ok(Index {
            schema: Arc::new(schema),
            analyzers,
            committed: Arc::new(InvertedIndex::new()),
            writer: IndexWriter::new(),
        })
    }

    /// The index schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// A shared handle to the current schema.
    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// The analyzers fields resolve their tokenizer names against.
    pub fn analyzers(&self) -> &Arc<AnalyzerRegistry> {
        &self.analyzers
    }

    /// Analyzer registered for a field.
    pub fn field_analyzer(&self, field: FieldId) -> Result<Arc<dyn Analyzer>> {
        let entry = self.schema.get_field_entry(field)?;
        self.analyzers.get(entry.tokenizer())
    }

    /// Tokenize every indexed value of a document.
    pub fn analyze(&self, document: Document) -> Result<AnalyzedDocument> {
        let mut analyzed = AnalyzedDocument::default();
        let mut next_position: BTreeMap<FieldId, u32> = BTreeMap::new();

        for (field, value) in document.field_values() {
            let entry = self.schema.get_field_entry(*field)?;
            if !entry.is_indexed() {
                continue;
            }

            let base = next_position.get(field).copied().unwrap_or(0);
            let terms = analyzed.terms.entry(*field).or_default();
            let mut last = None;
            let mut count = 0u32;

            match value {
                FieldValue::Text(text) => {
                    let analyzer = self.analyzers.get(entry.tokenizer())?;
                    for token in analyzer.analyze(text)? {
                        let position = base + token.position as u32;
                        terms.entry(token.text).or_default().push(position);
                        last = Some(position);
                        count += 1;
                    }
                }
                other => {
                    terms.entry(other.index_term()).or_default().push(base);
                    last = Some(base);
                    count = 1;
                }
            }

            *analyzed.field_lengths.entry(*field).or_default() += count;
            if let Some(last) = last {
                // Leave a gap so phrases never span two values.
                next_position.insert(*field, last + 2);
            }
        }

        analyzed.document = document;
        Ok(analyzed)
    }

    /// Queue a document built against this schema.
    pub fn add_document(&mut self, document: Document) -> Result<Opstamp> {
        let analyzed = self.analyze(document)?;
        Ok(self.writer.add_document(analyzed))
    }

    /// Queue a document given as a `{field: value | [values]}` JSON object.
    ///
    /// On a dynamic schema unseen fields are declared first; nothing is
    /// declared when the document is rejected.
    pub fn add_json_document(&mut self, object: &Map<String, Value>) -> Result<Opstamp> {
        let mut schema = (*self.schema).clone();
        let document = Document::from_json_object(&mut schema, object)?;
        if schema.num_fields() != self.schema.num_fields() {
            debug!(fields = schema.num_fields(), "schema grew");
            self.schema = Arc::new(schema);
        }
        self.add_document(document)
    }

    /// Queue a delete of every document holding `term` in `field`.
    pub fn delete_term(&mut self, field: &str, term: &str) -> Result<Opstamp> {
        let field_id = self.schema.require_field(field)?;
        if !self.schema.get_field_entry(field_id)?.is_indexed() {
            return Err(JpcError::index(format!("field {field} is not indexed")));
        }
        Ok(self.writer.delete_term(field_id, term))
    }

    /// Apply pending operations.
    pub fn commit(&mut self) -> Opstamp {
        let committed = Arc::make_mut(&mut self.committed);
        self.writer.commit(committed)
    }

    /// A searcher over the current committed state.
    pub fn searcher(&self) -> Searcher {
        Searcher::new(
            Arc::clone(&self.schema),
            Arc::clone(&self.committed),
            Arc::clone(&self.analyzers),
        )
    }

    /// Number of live committed documents.
    pub fn num_docs(&self) -> u32 {
        self.committed.num_docs()
    }

    /// Index statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_docs: self.committed.num_docs(),
            pending: self.writer.num_pending(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, TextKind};
    use serde_json::json;

    fn book_index() -> Index {
        let mut builder = Schema::builder();
        builder
            .add_text_field("title", TextKind::Text, true, true, Some("en_stem_with_stop_words"))
            .unwrap();
        builder
            .add_text_field("isbn", TextKind::String, true, true, None)
            .unwrap();
        builder.add_field("year", FieldType::I64, true, true).unwrap();
        Index::create_in_ram(builder.build(), Arc::new(AnalyzerRegistry::new().unwrap())).unwrap()
    }

    #[test]
    fn test_unknown_tokenizer_rejected() {
        let mut builder = Schema::builder();
        builder
            .add_text_field("title", TextKind::Text, true, true, Some("klingon"))
            .unwrap();
        let result = Index::create_in_ram(builder.build(), Arc::new(AnalyzerRegistry::new().unwrap()));
        assert!(result.is_err());
    }

    #[test]
    fn test_analyze_positions_and_lengths() {
        let index = book_index();
        let mut doc = Document::new();
        doc.add(0, FieldValue::Text("The Old Man and the Sea".to_string()));
        doc.add(1, FieldValue::Text("978-0684801223".to_string()));
        doc.add(2, FieldValue::I64(1952));

        let analyzed = index.analyze(doc).unwrap();

        assert_eq!(analyzed.field_lengths[&0], 3);
        assert_eq!(analyzed.terms[&0]["old"], vec![1]);
        assert_eq!(analyzed.terms[&0]["sea"], vec![5]);
        assert!(analyzed.terms[&1].contains_key("978-0684801223"));
        assert!(analyzed.terms[&2].contains_key("1952"));
    }

    #[test]
    fn test_commit_visibility() {
        let mut index = book_index();
        let object = json!({"title": "Of Mice and Men", "year": 1937});

        assert_eq!(index.add_json_document(object.as_object().unwrap()).unwrap(), 0);
        assert_eq!(index.num_docs(), 0);
        assert_eq!(index.stats().pending, 1);

        let before = index.searcher();
        assert_eq!(index.commit(), 1);
        assert_eq!(index.num_docs(), 1);
        assert_eq!(before.num_docs(), 0);
        assert_eq!(index.searcher().num_docs(), 1);
    }

    #[test]
    fn test_dynamic_schema_grows_only_on_success() {
        let mut index = Index::create_in_ram(
            Schema::dynamic(),
            Arc::new(AnalyzerRegistry::new().unwrap()),
        )
        .unwrap();

        let bad = json!({"a": "ok", "b": {"nested": true}});
        assert!(index.add_json_document(bad.as_object().unwrap()).is_err());
        assert_eq!(index.schema().num_fields(), 0);

        let good = json!({"body": "hello"});
        index.add_json_document(good.as_object().unwrap()).unwrap();
        assert_eq!(index.schema().num_fields(), 1);
    }

    #[test]
    fn test_delete_term_unknown_field() {
        let mut index = book_index();
        assert!(index.delete_term("nope", "x").is_err());
        assert_eq!(index.delete_term("isbn", "x").unwrap(), 0);
    }
}
