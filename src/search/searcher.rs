//! Searcher over one committed snapshot of an index.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::analysis::AnalyzerRegistry;
use crate::document::{Document, NamedDocument};
use crate::error::{JpcError, Result};
use crate::index::{DocId, InvertedIndex};
use crate::query::{BooleanQuery, FuzzyQuery, Occur, PhraseQuery, Query, TermQuery};
use crate::schema::{FieldId, Schema};
use crate::search::collector::{Collector, DocIdCollector, TopDocsCollector};
use crate::search::highlight::SnippetGenerator;
use crate::search::scoring::{Explanation, ScoringParams};

/// A scored search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Document id.
    pub doc_id: DocId,
    /// BM25 score.
    pub score: f32,
    /// How the score was computed.
    pub explanation: Explanation,
}

type Matches = AHashMap<DocId, Explanation>;

/// Searches the committed state an index had when the searcher was created.
#[derive(Debug, Clone)]
pub struct Searcher {
    schema: Arc<Schema>,
    segment: Arc<InvertedIndex>,
    analyzers: Arc<AnalyzerRegistry>,
}

impl Searcher {
    /// Create a searcher over a committed segment.
    pub fn new(
        schema: Arc<Schema>,
        segment: Arc<InvertedIndex>,
        analyzers: Arc<AnalyzerRegistry>,
    ) -> Self {
        Searcher {
            schema,
            segment,
            analyzers,
        }
    }

    /// The schema documents were indexed with.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of live documents visible to this searcher.
    pub fn num_docs(&self) -> u32 {
        self.segment.num_docs()
    }

    /// The `limit` best documents for `query`, best first.
    pub fn search(
        &self,
        query: &Query,
        limit: usize,
        params: &ScoringParams,
    ) -> Result<Vec<SearchHit>> {
        let mut matches = self.evaluate(query, params)?;
        let mut collector = TopDocsCollector::new(limit);
        for doc_id in sorted_ids(&matches) {
            collector.collect(doc_id, matches[&doc_id].value);
        }
        debug!(
            total_hits = collector.total_hits(),
            limit, "search collected"
        );

        Ok(collector
            .into_sorted_vec()
            .into_iter()
            .filter_map(|hit| {
                matches.remove(&hit.doc_id).map(|explanation| SearchHit {
                    doc_id: hit.doc_id,
                    score: hit.score,
                    explanation,
                })
            })
            .collect())
    }

    /// Documents matching `query` in doc id order; a `limit` of 0 returns all.
    pub fn search_raw(&self, query: &Query, limit: usize) -> Result<Vec<DocId>> {
        let matches = self.evaluate(query, &ScoringParams::default())?;
        let mut collector = DocIdCollector::new(limit);
        for doc_id in sorted_ids(&matches) {
            collector.collect(doc_id, 0.0);
        }
        Ok(collector.into_docs())
    }

    /// Explain the score of one document, or `None` if it does not match.
    pub fn explain(
        &self,
        query: &Query,
        doc_id: DocId,
        params: &ScoringParams,
    ) -> Result<Option<Explanation>> {
        self.doc(doc_id)?;
        Ok(self.evaluate(query, params)?.remove(&doc_id))
    }

    /// The stored document behind a doc id.
    pub fn doc(&self, doc_id: DocId) -> Result<&Document> {
        self.segment
            .doc(doc_id)
            .ok_or_else(|| JpcError::not_found(format!("document {doc_id} does not exist")))
    }

    /// Stored fields of a document keyed by field name.
    pub fn named_doc(&self, doc_id: DocId) -> Result<NamedDocument> {
        Ok(self.doc(doc_id)?.to_named_doc(&self.schema))
    }

    /// HTML snippets of `fields` for a document, keyed by field name.
    ///
    /// Fields that are not stored text are skipped; a field without a match
    /// maps to an empty string.
    pub fn snippets(
        &self,
        query: &Query,
        doc_id: DocId,
        fields: &[FieldId],
    ) -> Result<BTreeMap<String, String>> {
        let document = self.doc(doc_id)?;
        let terms = self.highlight_terms(query);
        let none = AHashSet::new();
        let mut snippets = BTreeMap::new();

        for &field in fields {
            let entry = self.schema.get_field_entry(field)?;
            if !entry.is_text() || !entry.is_stored() {
                continue;
            }
            let analyzer = self.analyzers.get(entry.tokenizer())?;
            let generator =
                SnippetGenerator::new(terms.get(&field).unwrap_or(&none), analyzer.as_ref());

            let mut html = String::new();
            for value in document.get_all(field).filter_map(|v| v.as_text()) {
                let snippet = generator.snippet(value)?;
                if !snippet.is_empty() {
                    html = snippet.to_html();
                    break;
                }
            }
            snippets.insert(entry.name().to_string(), html);
        }

        Ok(snippets)
    }

    /// Indexed terms per field that `query` matches, fuzzy expansions included.
    fn highlight_terms(&self, query: &Query) -> AHashMap<FieldId, AHashSet<String>> {
        let mut pairs = Vec::new();
        query.terms(&mut pairs);
        self.fuzzy_terms(query, &mut pairs);

        let mut terms: AHashMap<FieldId, AHashSet<String>> = AHashMap::new();
        for (field, term) in pairs {
            terms.entry(field).or_default().insert(term);
        }
        terms
    }

    fn fuzzy_terms(&self, query: &Query, out: &mut Vec<(FieldId, String)>) {
        match query {
            Query::Fuzzy(q) => out.extend(
                self.expand_fuzzy(q)
                    .into_iter()
                    .map(|term| (q.field, term.to_string())),
            ),
            Query::Boolean(q) => {
                for clause in &q.clauses {
                    if clause.occur != Occur::MustNot {
                        self.fuzzy_terms(&clause.query, out);
                    }
                }
            }
            _ => {}
        }
    }

    /// Matching documents and their explanations.
    fn evaluate(&self, query: &Query, params: &ScoringParams) -> Result<Matches> {
        match query {
            Query::Term(q) => Ok(self.evaluate_term(q, params)),
            Query::Phrase(q) => Ok(self.evaluate_phrase(q, params)),
            Query::Fuzzy(q) => Ok(self.evaluate_fuzzy(q, params)),
            Query::Boolean(q) => self.evaluate_boolean(q, params),
            Query::All => Ok(self
                .segment
                .live_docs()
                .map(|doc_id| (doc_id, Explanation::new(1.0, "all documents")))
                .collect()),
        }
    }

    fn field_name(&self, field: FieldId) -> &str {
        self.schema.get_field_name(field).unwrap_or("?")
    }

    fn evaluate_term(&self, query: &TermQuery, params: &ScoringParams) -> Matches {
        let Some(postings) = self.segment.postings(query.field, &query.term) else {
            return Matches::new();
        };

        let num_docs = self.segment.num_docs();
        let avg_len = self.segment.avg_field_length(query.field);
        let doc_freq = postings.doc_freq() as u32;
        let name = self.field_name(query.field);

        postings
            .iter()
            .map(|posting| {
                let explanation = params.explain_weight(
                    format!("weight({name}:{} in {})", query.term, posting.doc_id),
                    ScoringParams::explain_idf(doc_freq, num_docs),
                    posting.term_freq() as f32,
                    self.segment.field_length(posting.doc_id, query.field) as f32,
                    avg_len,
                );
                (posting.doc_id, explanation)
            })
            .collect()
    }

    fn evaluate_phrase(&self, query: &PhraseQuery, params: &ScoringParams) -> Matches {
        let mut lists = Vec::with_capacity(query.len());
        for (_, term) in &query.terms {
            match self.segment.postings(query.field, term) {
                Some(list) => lists.push(list),
                None => return Matches::new(),
            }
        }
        let Some((first, rest)) = lists.split_first() else {
            return Matches::new();
        };

        let num_docs = self.segment.num_docs();
        let avg_len = self.segment.avg_field_length(query.field);
        let name = self.field_name(query.field);
        let text = query
            .terms
            .iter()
            .map(|(_, term)| term.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let mut matches = Matches::new();
        for posting in first.iter() {
            let mut positions: Vec<&[u32]> = vec![posting.positions.as_slice()];
            for list in rest {
                match list.get(posting.doc_id) {
                    Some(other) => positions.push(other.positions.as_slice()),
                    None => break,
                }
            }
            if positions.len() != lists.len() {
                continue;
            }

            let freq = query.phrase_freq(&positions);
            if freq == 0 {
                continue;
            }

            let idf = Explanation::sum(
                "idf, sum of:",
                lists
                    .iter()
                    .map(|list| ScoringParams::explain_idf(list.doc_freq() as u32, num_docs))
                    .collect(),
            );
            let explanation = params.explain_weight(
                format!("weight({name}:\"{text}\" in {})", posting.doc_id),
                idf,
                freq as f32,
                self.segment.field_length(posting.doc_id, query.field) as f32,
                avg_len,
            );
            matches.insert(posting.doc_id, explanation);
        }
        matches
    }

    /// Dictionary terms within the query's edit distance.
    fn expand_fuzzy<'a>(&'a self, query: &FuzzyQuery) -> Vec<&'a str> {
        self.segment
            .terms(query.field)
            .filter(|(term, _)| query.matches(term).is_some())
            .map(|(term, _)| term.as_str())
            .collect()
    }

    fn evaluate_fuzzy(&self, query: &FuzzyQuery, params: &ScoringParams) -> Matches {
        let mut parts: AHashMap<DocId, Vec<Explanation>> = AHashMap::new();
        for term in self.expand_fuzzy(query) {
            let expanded = TermQuery::new(query.field, term);
            for (doc_id, explanation) in self.evaluate_term(&expanded, params) {
                parts.entry(doc_id).or_default().push(explanation);
            }
        }

        let name = self.field_name(query.field);
        parts
            .into_iter()
            .map(|(doc_id, details)| {
                let description = format!(
                    "fuzzy({name}:{}~{}), sum of:",
                    query.term, query.distance
                );
                (doc_id, Explanation::sum(description, details))
            })
            .collect()
    }

    fn evaluate_boolean(&self, query: &BooleanQuery, params: &ScoringParams) -> Result<Matches> {
        if query.clauses.is_empty() {
            return Ok(Matches::new());
        }

        let must = query
            .clauses_with(Occur::Must)
            .map(|q| self.evaluate(q, params))
            .collect::<Result<Vec<_>>>()?;
        let should = query
            .clauses_with(Occur::Should)
            .map(|q| self.evaluate(q, params))
            .collect::<Result<Vec<_>>>()?;
        let mut excluded: AHashSet<DocId> = AHashSet::new();
        for q in query.clauses_with(Occur::MustNot) {
            excluded.extend(self.evaluate(q, params)?.into_keys());
        }

        let candidates: Vec<DocId> = if let Some((first, others)) = must.split_first() {
            first
                .keys()
                .copied()
                .filter(|doc_id| others.iter().all(|m| m.contains_key(doc_id)))
                .collect()
        } else if !should.is_empty() {
            let mut union: AHashSet<DocId> = AHashSet::new();
            for m in &should {
                union.extend(m.keys().copied());
            }
            union.into_iter().collect()
        } else {
            // Only exclusions: everything else matches without score.
            return Ok(self
                .segment
                .live_docs()
                .filter(|doc_id| !excluded.contains(doc_id))
                .map(|doc_id| (doc_id, Explanation::new(0.0, "not excluded")))
                .collect());
        };

        Ok(candidates
            .into_iter()
            .filter(|doc_id| !excluded.contains(doc_id))
            .map(|doc_id| {
                let details = must
                    .iter()
                    .chain(should.iter())
                    .filter_map(|m| m.get(&doc_id).cloned())
                    .collect();
                (doc_id, Explanation::sum("sum of:", details))
            })
            .collect())
    }
}

fn sorted_ids(matches: &Matches) -> Vec<DocId> {
    let mut ids: Vec<DocId> = matches.keys().copied().collect();
    ids.sort_unstable();
    ids
}
