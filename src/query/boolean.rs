//! Boolean query combining clauses with must / should / must-not.

use serde::Serialize;

use crate::query::query::Query;

/// How a clause participates in a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause may match and adds to the score.
    Should,
    /// The clause must not match.
    MustNot,
}

/// A clause of a boolean query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanClause {
    /// Occurrence requirement.
    pub occur: Occur,
    /// Sub-query.
    pub query: Query,
}

/// A boolean combination of sub-queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BooleanQuery {
    /// Clauses in declaration order.
    pub clauses: Vec<BooleanClause>,
}

impl BooleanQuery {
    /// Create an empty boolean query. It matches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause.
    pub fn add(mut self, occur: Occur, query: Query) -> Self {
        self.clauses.push(BooleanClause { occur, query });
        self
    }

    /// Create a query where every sub-query is optional.
    pub fn union(queries: Vec<Query>) -> Self {
        BooleanQuery {
            clauses: queries
                .into_iter()
                .map(|query| BooleanClause {
                    occur: Occur::Should,
                    query,
                })
                .collect(),
        }
    }

    /// Clauses with the given occurrence.
    pub fn clauses_with(&self, occur: Occur) -> impl Iterator<Item = &Query> {
        self.clauses
            .iter()
            .filter(move |clause| clause.occur == occur)
            .map(|clause| &clause.query)
    }
}
