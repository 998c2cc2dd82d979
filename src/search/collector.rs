//! Collector implementations for gathering search results.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;

use crate::index::DocId;

/// Trait for collecting matching documents.
///
/// Documents are offered in ascending doc id order.
pub trait Collector: Debug {
    /// Collect a document hit.
    fn collect(&mut self, doc_id: DocId, score: f32);

    /// Get the total number of hits offered.
    fn total_hits(&self) -> u64;
}

/// A scored document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    /// Document id.
    pub doc_id: DocId,
    /// Document score.
    pub score: f32,
}

impl Eq for ScoredDoc {}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDoc {
    /// Better documents sort first: higher score, then lower doc id.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// A collector that keeps the top N documents by score.
#[derive(Debug)]
pub struct TopDocsCollector {
    /// Maximum number of documents to collect.
    max_docs: usize,
    /// Collected hits; the heap top is the worst kept hit.
    hits: BinaryHeap<ScoredDoc>,
    /// Total number of documents processed.
    total_hits: u64,
}

impl TopDocsCollector {
    /// Create a new top docs collector.
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(1024)),
            total_hits: 0,
        }
    }

    /// Get the maximum number of documents to collect.
    pub fn max_docs(&self) -> usize {
        self.max_docs
    }

    /// The kept hits, best first.
    pub fn into_sorted_vec(self) -> Vec<ScoredDoc> {
        self.hits.into_sorted_vec()
    }
}

impl Collector for TopDocsCollector {
    fn collect(&mut self, doc_id: DocId, score: f32) {
        self.total_hits += 1;
        if self.max_docs == 0 {
            return;
        }

        let scored_doc = ScoredDoc { doc_id, score };

        if self.hits.len() < self.max_docs {
            self.hits.push(scored_doc);
        } else if let Some(worst) = self.hits.peek() {
            if scored_doc < *worst {
                self.hits.pop();
                self.hits.push(scored_doc);
            }
        }
    }

    fn total_hits(&self) -> u64 {
        self.total_hits
    }
}

/// A collector that keeps matching documents in doc id order.
#[derive(Debug, Default)]
pub struct DocIdCollector {
    /// Maximum number of documents to keep; 0 keeps all of them.
    limit: usize,
    docs: Vec<DocId>,
    total_hits: u64,
}

impl DocIdCollector {
    /// Create a collector keeping the first `limit` documents (0 for all).
    pub fn new(limit: usize) -> Self {
        DocIdCollector {
            limit,
            docs: Vec::new(),
            total_hits: 0,
        }
    }

    /// The kept doc ids, ascending.
    pub fn into_docs(self) -> Vec<DocId> {
        self.docs
    }
}

impl Collector for DocIdCollector {
    fn collect(&mut self, doc_id: DocId, _score: f32) {
        self.total_hits += 1;
        if self.limit == 0 || self.docs.len() < self.limit {
            self.docs.push(doc_id);
        }
    }

    fn total_hits(&self) -> u64 {
        self.total_hits
    }
}
