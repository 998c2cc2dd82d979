//! Search over committed index snapshots: scoring, collection and snippets.

pub mod collector;
pub mod highlight;
pub mod scoring;
pub mod searcher;

pub use self::collector::{Collector, DocIdCollector, ScoredDoc, TopDocsCollector};
pub use self::highlight::{Snippet, SnippetGenerator};
pub use self::scoring::{Explanation, ScoringParams};
pub use self::searcher::{SearchHit, Searcher};
