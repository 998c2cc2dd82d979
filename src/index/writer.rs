//! Index writer: stamps operations and applies them on commit.

use tracing::debug;

use crate::index::inverted::{AnalyzedDocument, InvertedIndex};
use crate::schema::FieldId;

/// Monotonic operation stamp, starting at 0.
pub type Opstamp = u64;

/// A pending writer operation.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Add an analyzed document.
    Add(AnalyzedDocument),
    /// Delete documents containing the exact term.
    Delete {
        /// Field to look in.
        field: FieldId,
        /// Indexed term, matched verbatim.
        term: String,
    },
}

/// Buffers operations until commit.
///
/// Every add, delete and commit consumes one opstamp. A delete only affects
/// documents added with a smaller opstamp.
#[derive(Debug, Default)]
pub struct IndexWriter {
    next_opstamp: Opstamp,
    pending: Vec<(Opstamp, Operation)>,
}

impl IndexWriter {
    /// Create a writer whose first opstamp is 0.
    pub fn new() -> Self {
        Self::default()
    }

    fn stamp(&mut self) -> Opstamp {
        let opstamp = self.next_opstamp;
        self.next_opstamp += 1;
        opstamp
    }

    /// Queue a document.
    pub fn add_document(&mut self, doc: AnalyzedDocument) -> Opstamp {
        let opstamp = self.stamp();
        self.pending.push((opstamp, Operation::Add(doc)));
        opstamp
    }

    /// Queue a delete-by-term.
    pub fn delete_term(&mut self, field: FieldId, term: &str) -> Opstamp {
        let opstamp = self.stamp();
        self.pending.push((
            opstamp,
            Operation::Delete {
                field,
                term: term.to_string(),
            },
        ));
        opstamp
    }

    /// Apply pending operations in opstamp order and return the commit opstamp.
    pub fn commit(&mut self, index: &mut InvertedIndex) -> Opstamp {
        let mut added = 0usize;
        let mut deleted = 0usize;

        for (_, operation) in self.pending.drain(..) {
            match operation {
                Operation::Add(doc) => {
                    index.add(doc);
                    added += 1;
                }
                Operation::Delete { field, term } => {
                    deleted += index.delete_term(field, &term);
                }
            }
        }

        let opstamp = self.stamp();
        debug!(opstamp, added, deleted, "commit");
        opstamp
    }

    /// Number of operations waiting for commit.
    pub fn num_pending(&self) -> usize {
        self.pending.len()
    }
}
