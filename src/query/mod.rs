//! Query module: the query tree, its parser and fuzzy matching.

pub mod boolean;
pub mod fuzzy;
pub mod parser;
pub mod phrase;
#[allow(clippy::module_inception)]
pub mod query;
pub mod term;

pub use boolean::{BooleanClause, BooleanQuery, Occur};
pub use fuzzy::FuzzyQuery;
pub use parser::QueryParser;
pub use phrase::PhraseQuery;
pub use query::Query;
pub use term::TermQuery;
