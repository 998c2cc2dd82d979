//! Query parser for converting string queries to structured query objects.
//!
//! Supported syntax:
//! - Simple terms: `hello`, searched in every default field
//! - Field-specific terms: `title:hello`
//! - Phrases: `"old man"` and `title:"old man"`
//! - Boolean operators: `+required -forbidden optional`, `NOT forbidden`
//! - Parentheses: `(title:sea OR body:fish)`
//! - AND/OR operators: `title:old AND body:man`
//!
//! Juxtaposed clauses are joined with OR. Parentheses nest at most
//! [`MAX_DEPTH`] levels. Terms pass through the field's analyzer; a term
//! producing several tokens becomes a phrase and a term producing none (a
//! stop word) is dropped.

use std::sync::Arc;

use crate::analysis::AnalyzerRegistry;
use crate::document::FieldValue;
use crate::error::{JpcError, Result};
use crate::index::Index;
use crate::query::boolean::{BooleanQuery, Occur};
use crate::query::fuzzy::FuzzyQuery;
use crate::query::phrase::PhraseQuery;
use crate::query::query::Query;
use crate::query::term::TermQuery;
use crate::schema::{FieldId, FieldType, Schema};

/// Deepest parenthesis nesting a query string may use.
pub const MAX_DEPTH: usize = 64;

/// Parses query strings against a schema.
#[derive(Debug, Clone)]
pub struct QueryParser {
    schema: Arc<Schema>,
    analyzers: Arc<AnalyzerRegistry>,
    default_fields: Vec<FieldId>,
}

impl QueryParser {
    /// Create a parser searching `default_fields` for unqualified terms.
    pub fn new(
        schema: Arc<Schema>,
        analyzers: Arc<AnalyzerRegistry>,
        default_fields: Vec<FieldId>,
    ) -> Self {
        QueryParser {
            schema,
            analyzers,
            default_fields,
        }
    }

    /// Create a parser for an index.
    pub fn for_index(index: &Index, default_fields: Vec<FieldId>) -> Self {
        Self::new(
            index.shared_schema(),
            Arc::clone(index.analyzers()),
            default_fields,
        )
    }

    /// The default search fields.
    pub fn default_fields(&self) -> &[FieldId] {
        &self.default_fields
    }

    /// Parse a query string. An empty string matches every document.
    pub fn parse_query(&self, query_str: &str) -> Result<Query> {
        if query_str.trim().is_empty() {
            return Ok(Query::All);
        }

        let mut parser = QueryStringParser {
            chars: query_str.chars().collect(),
            pos: 0,
            depth: 0,
            owner: self,
        };
        let clauses = parser.parse_or_expression()?;
        parser.skip_whitespace();
        if let Some(ch) = parser.peek() {
            return Err(JpcError::query(format!(
                "unexpected {ch:?} at offset {}",
                parser.pos
            )));
        }

        Ok(combine(clauses).unwrap_or_else(|| BooleanQuery::new().into()))
    }

    /// Build a fuzzy query for a single term of a field.
    pub fn fuzzy_query(
        &self,
        field: FieldId,
        term: &str,
        distance: u8,
        transposition: bool,
    ) -> Result<Query> {
        let entry = self.schema.get_field_entry(field)?;
        if entry.field_type() != FieldType::Text {
            return Err(JpcError::query(format!(
                "fuzzy queries need a text field, {} is {}",
                entry.name(),
                entry.field_type().as_str()
            )));
        }

        let analyzer = self.analyzers.get(entry.tokenizer())?;
        let mut tokens: Vec<String> = analyzer.analyze(term)?.map(|t| t.text).collect();
        let term = if tokens.len() == 1 {
            tokens.remove(0)
        } else {
            term.to_string()
        };

        Ok(FuzzyQuery::new(field, term)
            .distance(distance)
            .transposition(transposition)
            .into())
    }

    /// Query for `text` in one field; `None` when analysis leaves no token.
    fn field_query(&self, field: FieldId, text: &str) -> Result<Option<Query>> {
        let entry = self.schema.get_field_entry(field)?;
        if !entry.is_indexed() {
            return Err(JpcError::query(format!(
                "field {} is not indexed",
                entry.name()
            )));
        }

        if entry.field_type() != FieldType::Text {
            let value = FieldValue::from_text(entry.field_type(), text)?;
            return Ok(Some(TermQuery::new(field, value.index_term()).into()));
        }

        let analyzer = self.analyzers.get(entry.tokenizer())?;
        let tokens: Vec<_> = analyzer.analyze(text)?.collect();

        Ok(match tokens.len() {
            0 => None,
            1 => Some(TermQuery::new(field, tokens[0].text.clone()).into()),
            _ => {
                let first = tokens[0].position as u32;
                let terms = tokens
                    .into_iter()
                    .map(|t| (t.position as u32 - first, t.text))
                    .collect();
                Some(PhraseQuery::with_offsets(field, terms).into())
            }
        })
    }

    /// Query for `text` across the default fields.
    fn default_query(&self, text: &str) -> Result<Option<Query>> {
        if self.default_fields.is_empty() {
            return Err(JpcError::query(format!(
                "no default field declared for {text:?}"
            )));
        }

        let mut per_field = Vec::new();
        for field in &self.default_fields {
            match self.field_query(*field, text) {
                Ok(Some(query)) => per_field.push(query),
                Ok(None) => {}
                // A bare word that is not a number simply misses numeric fields.
                Err(JpcError::Query(_)) if self.is_numeric(*field) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(match per_field.len() {
            0 => None,
            1 => per_field.pop(),
            _ => Some(BooleanQuery::union(per_field).into()),
        })
    }

    fn is_numeric(&self, field: FieldId) -> bool {
        self.schema
            .get_field_entry(field)
            .map(|entry| entry.field_type() != FieldType::Text)
            .unwrap_or(false)
    }
}

/// Fold `(occur, query)` clauses into one query.
fn combine(mut clauses: Vec<(Occur, Query)>) -> Option<Query> {
    match clauses.len() {
        0 => None,
        1 if clauses[0].0 != Occur::MustNot => clauses.pop().map(|(_, q)| q),
        _ => {
            let mut boolean = BooleanQuery::new();
            for (occur, query) in clauses {
                boolean = boolean.add(occur, query);
            }
            Some(boolean.into())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Prefix {
    None,
    Must,
    MustNot,
}

/// Internal parser for parsing query strings.
struct QueryStringParser<'a> {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    owner: &'a QueryParser,
}

impl QueryStringParser<'_> {
    fn parse_or_expression(&mut self) -> Result<Vec<(Occur, Query)>> {
        let mut clauses = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(')') => break,
                _ => {}
            }
            if self.consume_keyword("OR") {
                continue;
            }

            let mut group = self.parse_and_expression()?;

            if group.len() == 1 {
                if let Some(Some((prefix, query))) = group.pop() {
                    clauses.push((resolve(prefix, Occur::Should), query));
                }
            } else {
                let anded: Vec<_> = group
                    .into_iter()
                    .flatten()
                    .map(|(prefix, query)| (resolve(prefix, Occur::Must), query))
                    .collect();
                if let Some(query) = combine(anded) {
                    clauses.push((Occur::Should, query));
                }
            }
        }

        Ok(clauses)
    }

    /// Clauses joined by explicit AND. Dropped clauses are kept as `None`
    /// so a single surviving clause is still known to be part of a group.
    fn parse_and_expression(&mut self) -> Result<Vec<Option<(Prefix, Query)>>> {
        let mut group = vec![self.parse_clause()?];

        loop {
            self.skip_whitespace();
            if !self.consume_keyword("AND") {
                break;
            }
            group.push(self.parse_clause()?);
        }

        Ok(group)
    }

    fn parse_clause(&mut self) -> Result<Option<(Prefix, Query)>> {
        self.skip_whitespace();

        let prefix = if self.peek() == Some('+') && self.next_is_content(1) {
            self.pos += 1;
            Prefix::Must
        } else if self.peek() == Some('-') && self.next_is_content(1) {
            self.pos += 1;
            Prefix::MustNot
        } else if self.consume_keyword("NOT") {
            Prefix::MustNot
        } else {
            Prefix::None
        };
        self.skip_whitespace();

        let query = match self.peek() {
            None => return Err(JpcError::query("expected a term but found end of input")),
            Some('(') => {
                if self.depth == MAX_DEPTH {
                    return Err(JpcError::query(format!(
                        "query nested deeper than {MAX_DEPTH} levels"
                    )));
                }
                self.pos += 1;
                self.depth += 1;
                let inner = self.parse_or_expression()?;
                self.depth -= 1;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(JpcError::query("missing closing parenthesis"));
                }
                self.pos += 1;
                combine(inner)
            }
            Some('"') => {
                let phrase = self.consume_phrase()?;
                self.owner.default_query(&phrase)?
            }
            Some(')') => return Err(JpcError::query("unexpected closing parenthesis")),
            Some(_) => {
                let word = self.consume_word();
                match split_field(&word) {
                    Some((field_name, rest)) => {
                        let field = self
                            .owner
                            .schema
                            .get_field(field_name)
                            .ok_or_else(|| {
                                JpcError::query(format!("field {field_name} does not exist"))
                            })?;
                        let text = if rest.is_empty() {
                            if self.peek() != Some('"') {
                                return Err(JpcError::query(format!(
                                    "expected a term after {field_name}:"
                                )));
                            }
                            self.consume_phrase()?
                        } else {
                            rest.to_string()
                        };
                        self.owner.field_query(field, &text)?
                    }
                    None => self.owner.default_query(&word)?,
                }
            }
        };

        Ok(query.map(|q| (prefix, q)))
    }

    fn consume_phrase(&mut self) -> Result<String> {
        // Opening quote.
        self.pos += 1;
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '"' {
                let phrase: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(phrase);
            }
            self.pos += 1;
        }
        Err(JpcError::query("unterminated phrase"))
    }

    fn consume_word(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Consume an operator keyword followed by whitespace or end of input.
    fn consume_keyword(&mut self, keyword: &str) -> bool {
        let len = keyword.chars().count();
        let end = self.pos + len;
        if end > self.chars.len() {
            return false;
        }
        let matches = self.chars[self.pos..end].iter().copied().eq(keyword.chars());
        let bounded = self
            .chars
            .get(end)
            .is_none_or(|ch| ch.is_whitespace() || *ch == '(');
        if matches && bounded {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn next_is_content(&self, offset: usize) -> bool {
        self.chars
            .get(self.pos + offset)
            .is_some_and(|ch| !ch.is_whitespace())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }
}

fn resolve(prefix: Prefix, default: Occur) -> Occur {
    match prefix {
        Prefix::None => default,
        Prefix::Must => Occur::Must,
        Prefix::MustNot => Occur::MustNot,
    }
}

/// Split `field:rest` when the prefix looks like a field name.
fn split_field(word: &str) -> Option<(&str, &str)> {
    let (field, rest) = word.split_once(':')?;
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '.');
    valid.then_some((field, rest))
}
