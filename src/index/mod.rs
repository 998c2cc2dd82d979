//! Index module: postings, the committed segment and the writer.

#[allow(clippy::module_inception)]
pub mod index;
pub mod inverted;
pub mod posting;
pub mod writer;

pub use index::{Index, IndexStats};
pub use inverted::{AnalyzedDocument, InvertedIndex};
pub use posting::{DocId, Posting, PostingList};
pub use writer::{IndexWriter, Opstamp};
