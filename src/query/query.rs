//! The query tree evaluated by the searcher.

use serde::Serialize;

use crate::query::boolean::BooleanQuery;
use crate::query::fuzzy::FuzzyQuery;
use crate::query::phrase::PhraseQuery;
use crate::query::term::TermQuery;
use crate::schema::FieldId;

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    /// Exact term.
    Term(TermQuery),
    /// Terms at consecutive positions.
    Phrase(PhraseQuery),
    /// Boolean combination.
    Boolean(BooleanQuery),
    /// Terms within an edit distance.
    Fuzzy(FuzzyQuery),
    /// Every live document.
    All,
}

impl Query {
    /// Collect the exact `(field, term)` pairs this query names.
    ///
    /// Fuzzy queries contribute nothing here; their expansions depend on the
    /// index and are resolved by the searcher.
    pub fn terms(&self, out: &mut Vec<(FieldId, String)>) {
        match self {
            Query::Term(q) => out.push((q.field, q.term.clone())),
            Query::Phrase(q) => out.extend(q.terms.iter().map(|(_, t)| (q.field, t.clone()))),
            Query::Boolean(q) => {
                for clause in &q.clauses {
                    if clause.occur != crate::query::Occur::MustNot {
                        clause.query.terms(out);
                    }
                }
            }
            Query::Fuzzy(_) | Query::All => {}
        }
    }
}

impl From<TermQuery> for Query {
    fn from(q: TermQuery) -> Self {
        Query::Term(q)
    }
}

impl From<PhraseQuery> for Query {
    fn from(q: PhraseQuery) -> Self {
        Query::Phrase(q)
    }
}

impl From<BooleanQuery> for Query {
    fn from(q: BooleanQuery) -> Self {
        Query::Boolean(q)
    }
}

impl From<FuzzyQuery> for Query {
    fn from(q: FuzzyQuery) -> Self {
        Query::Fuzzy(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Occur;

    #[test]
    fn test_terms_skip_must_not() {
        let query: Query = BooleanQuery::new()
            .add(Occur::Should, TermQuery::new(0, "sea").into())
            .add(Occur::MustNot, TermQuery::new(0, "mice").into())
            .add(Occur::Must, PhraseQuery::new(1, ["old", "man"]).into())
            .into();

        let mut terms = Vec::new();
        query.terms(&mut terms);

        assert_eq!(
            terms,
            vec![
                (0, "sea".to_string()),
                (1, "old".to_string()),
                (1, "man".to_string())
            ]
        );
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(Query::from(TermQuery::new(2, "sea"))).unwrap();
        assert_eq!(json["type"], "term");
        assert_eq!(json["field"], 2);
        assert_eq!(serde_json::to_value(Query::All).unwrap()["type"], "all");
    }
}
