//! Committed in-memory inverted index.
//!
//! Holds postings per `(field, term)`, per-document field lengths and the
//! documents themselves. Only [`IndexWriter::commit`](crate::index::IndexWriter::commit)
//! mutates it.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::document::Document;
use crate::index::posting::{DocId, Posting, PostingList};
use crate::schema::FieldId;

/// A document after analysis, ready to be inverted.
#[derive(Debug, Clone, Default)]
pub struct AnalyzedDocument {
    /// The source document; stored fields are served from it.
    pub document: Document,
    /// Positions of every term, per indexed field.
    pub terms: AHashMap<FieldId, BTreeMap<String, Vec<u32>>>,
    /// Number of tokens per indexed field.
    pub field_lengths: AHashMap<FieldId, u32>,
}

#[derive(Debug, Clone)]
struct DocEntry {
    document: Document,
    field_lengths: AHashMap<FieldId, u32>,
    terms: Vec<(FieldId, String)>,
}

/// Collection-wide statistics for a field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldStats {
    /// Sum of the lengths of this field over live documents.
    pub total_length: u64,
}

/// The committed state searched by [`Searcher`](crate::search::Searcher).
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    terms: AHashMap<FieldId, BTreeMap<String, PostingList>>,
    docs: Vec<Option<DocEntry>>,
    field_stats: AHashMap<FieldId, FieldStats>,
    num_docs: u32,
}

impl InvertedIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invert a document and return its id.
    pub fn add(&mut self, analyzed: AnalyzedDocument) -> DocId {
        let doc_id = self.docs.len() as DocId;
        let mut doc_terms = Vec::new();

        for (field, terms) in analyzed.terms {
            let dictionary = self.terms.entry(field).or_default();
            for (term, positions) in terms {
                dictionary
                    .entry(term.clone())
                    .or_default()
                    .push(Posting::new(doc_id, positions));
                doc_terms.push((field, term));
            }
        }

        for (field, length) in &analyzed.field_lengths {
            self.field_stats.entry(*field).or_default().total_length += u64::from(*length);
        }

        self.docs.push(Some(DocEntry {
            document: analyzed.document,
            field_lengths: analyzed.field_lengths,
            terms: doc_terms,
        }));
        self.num_docs += 1;

        doc_id
    }

    /// Delete every live document containing `term` in `field`.
    ///
    /// Returns the number of deleted documents.
    pub fn delete_term(&mut self, field: FieldId, term: &str) -> usize {
        let doomed: Vec<DocId> = match self.postings(field, term) {
            Some(list) => list.iter().map(|p| p.doc_id).collect(),
            None => return 0,
        };

        for doc_id in &doomed {
            self.delete_doc(*doc_id);
        }

        doomed.len()
    }

    fn delete_doc(&mut self, doc_id: DocId) {
        let Some(entry) = self.docs.get_mut(doc_id as usize).and_then(Option::take) else {
            return;
        };

        for (field, term) in &entry.terms {
            if let Some(dictionary) = self.terms.get_mut(field) {
                if let Some(list) = dictionary.get_mut(term) {
                    list.remove(doc_id);
                    if list.is_empty() {
                        dictionary.remove(term);
                    }
                }
            }
        }
        for (field, length) in &entry.field_lengths {
            if let Some(stats) = self.field_stats.get_mut(field) {
                stats.total_length = stats.total_length.saturating_sub(u64::from(*length));
            }
        }
        self.num_docs -= 1;
    }

    /// Postings of a term.
    pub fn postings(&self, field: FieldId, term: &str) -> Option<&PostingList> {
        self.terms.get(&field).and_then(|dict| dict.get(term))
    }

    /// Iterate the term dictionary of a field in lexicographic order.
    pub fn terms(&self, field: FieldId) -> impl Iterator<Item = (&String, &PostingList)> {
        self.terms.get(&field).into_iter().flat_map(|dict| dict.iter())
    }

    /// Stored document of a live doc id.
    pub fn doc(&self, doc_id: DocId) -> Option<&Document> {
        self.entry(doc_id).map(|entry| &entry.document)
    }

    /// Number of tokens of `field` in a document.
    pub fn field_length(&self, doc_id: DocId, field: FieldId) -> u32 {
        self.entry(doc_id)
            .and_then(|entry| entry.field_lengths.get(&field).copied())
            .unwrap_or(0)
    }

    /// Average length of `field` over live documents.
    pub fn avg_field_length(&self, field: FieldId) -> f32 {
        if self.num_docs == 0 {
            return 0.0;
        }
        let total = self
            .field_stats
            .get(&field)
            .map(|stats| stats.total_length)
            .unwrap_or(0);
        total as f32 / self.num_docs as f32
    }

    /// Number of live documents.
    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    /// One past the highest doc id ever assigned.
    pub fn max_doc(&self) -> DocId {
        self.docs.len() as DocId
    }

    /// Whether a doc id refers to a live document.
    pub fn is_live(&self, doc_id: DocId) -> bool {
        self.entry(doc_id).is_some()
    }

    /// Live doc ids in ascending order.
    pub fn live_docs(&self) -> impl Iterator<Item = DocId> + '_ {
        self.docs
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_some())
            .map(|(id, _)| id as DocId)
    }

    fn entry(&self, doc_id: DocId) -> Option<&DocEntry> {
        self.docs.get(doc_id as usize).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FieldValue;

    fn analyzed(text: &str) -> AnalyzedDocument {
        let mut doc = Document::new();
        doc.add(0, FieldValue::Text(text.to_string()));

        let mut terms: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        let mut length = 0;
        for (pos, word) in text.split_whitespace().enumerate() {
            terms.entry(word.to_string()).or_default().push(pos as u32);
            length += 1;
        }

        let mut result = AnalyzedDocument {
            document: doc,
            ..Default::default()
        };
        result.terms.insert(0, terms);
        result.field_lengths.insert(0, length);
        result
    }

    #[test]
    fn test_add_and_lookup() {
        let mut index = InvertedIndex::new();
        let a = index.add(analyzed("old man sea"));
        let b = index.add(analyzed("sea sea"));

        assert_eq!((a, b), (0, 1));
        assert_eq!(index.num_docs(), 2);
        assert_eq!(index.postings(0, "sea").unwrap().doc_freq(), 2);
        assert_eq!(index.postings(0, "sea").unwrap().get(1).unwrap().term_freq(), 2);
        assert_eq!(index.field_length(0, 0), 3);
        assert_eq!(index.avg_field_length(0), 2.5);

        let terms: Vec<_> = index.terms(0).map(|(t, _)| t.as_str()).collect();
        assert_eq!(terms, vec!["man", "old", "sea"]);
    }

    #[test]
    fn test_delete_term() {
        let mut index = InvertedIndex::new();
        index.add(analyzed("old man sea"));
        index.add(analyzed("mice men"));

        assert_eq!(index.delete_term(0, "old"), 1);
        assert_eq!(index.delete_term(0, "old"), 0);
        assert_eq!(index.num_docs(), 1);
        assert!(index.postings(0, "sea").is_none());
        assert!(!index.is_live(0));
        assert_eq!(index.live_docs().collect::<Vec<_>>(), vec![1]);
        assert_eq!(index.avg_field_length(0), 2.0);
        assert_eq!(index.max_doc(), 2);
    }
}
