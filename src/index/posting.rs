//! Posting lists.

/// Document id inside an index. Ids are assigned at commit and never reused.
pub type DocId = u32;

/// One document's occurrences of a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Document ID.
    pub doc_id: DocId,
    /// Positions of the term in the field, ascending.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Create a posting from its positions.
    pub fn new(doc_id: DocId, positions: Vec<u32>) -> Self {
        Posting { doc_id, positions }
    }

    /// Term frequency in the document.
    pub fn term_freq(&self) -> u32 {
        self.positions.len() as u32
    }
}

/// Postings of one term, sorted by document id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    postings: Vec<Posting>,
}

impl PostingList {
    /// Create a new empty posting list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a posting. Documents arrive in ascending id order.
    pub fn push(&mut self, posting: Posting) {
        debug_assert!(
            self.postings
                .last()
                .is_none_or(|last| last.doc_id < posting.doc_id)
        );
        self.postings.push(posting);
    }

    /// Drop the posting of a document, if present.
    pub fn remove(&mut self, doc_id: DocId) {
        if let Ok(idx) = self.postings.binary_search_by_key(&doc_id, |p| p.doc_id) {
            self.postings.remove(idx);
        }
    }

    /// Find the posting of a document.
    pub fn get(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|idx| &self.postings[idx])
    }

    /// Number of documents containing the term.
    pub fn doc_freq(&self) -> u64 {
        self.postings.len() as u64
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Iterate the postings in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }
}
