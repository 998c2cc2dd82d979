//! Snippet generation for search results.

use std::ops::Range;

use ahash::AHashSet;

use crate::analysis::{Analyzer, Token};
use crate::error::Result;

/// Maximum length of a snippet fragment in bytes.
pub const DEFAULT_MAX_NUM_BYTES: usize = 150;

/// A fragment of a field value with the ranges of matched terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippet {
    fragment: String,
    highlighted: Vec<Range<usize>>,
}

impl Snippet {
    /// The raw fragment text.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Byte ranges of the fragment that matched the query.
    pub fn highlighted(&self) -> &[Range<usize>] {
        &self.highlighted
    }

    /// Whether nothing in the field matched.
    pub fn is_empty(&self) -> bool {
        self.highlighted.is_empty()
    }

    /// Render as HTML, wrapping every match in `<b>`.
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(self.fragment.len() + self.highlighted.len() * 7);
        let mut cursor = 0;
        for range in &self.highlighted {
            html.push_str(&escape_html(&self.fragment[cursor..range.start]));
            html.push_str("<b>");
            html.push_str(&escape_html(&self.fragment[range.clone()]));
            html.push_str("</b>");
            cursor = range.end;
        }
        html.push_str(&escape_html(&self.fragment[cursor..]));
        html
    }
}

/// Cuts snippets out of field values for a set of matched terms.
#[derive(Debug)]
pub struct SnippetGenerator<'a> {
    terms: &'a AHashSet<String>,
    analyzer: &'a dyn Analyzer,
}

impl<'a> SnippetGenerator<'a> {
    /// Create a generator for the terms matched in one field.
    pub fn new(terms: &'a AHashSet<String>, analyzer: &'a dyn Analyzer) -> Self {
        SnippetGenerator { terms, analyzer }
    }

    /// Build the snippet of `text` around its first matched term.
    pub fn snippet(&self, text: &str) -> Result<Snippet> {
        if self.terms.is_empty() {
            return Ok(Snippet::default());
        }

        let tokens: Vec<Token> = self.analyzer.analyze(text)?.collect();
        let Some(first) = tokens.iter().find(|t| self.terms.contains(&t.text)) else {
            return Ok(Snippet::default());
        };

        let start = if first.end_offset <= DEFAULT_MAX_NUM_BYTES {
            0
        } else {
            first.start_offset
        };
        let limit = start + DEFAULT_MAX_NUM_BYTES;
        let end = tokens
            .iter()
            .filter(|t| t.start_offset >= start && t.end_offset <= limit)
            .map(|t| t.end_offset)
            .max()
            .unwrap_or(first.end_offset)
            .max(first.end_offset);

        let Some(fragment) = text.get(start..end) else {
            return Ok(Snippet::default());
        };

        let mut highlighted: Vec<Range<usize>> = Vec::new();
        for token in &tokens {
            if token.start_offset < start
                || token.end_offset > end
                || !self.terms.contains(&token.text)
            {
                continue;
            }
            let range = token.start_offset - start..token.end_offset - start;
            if highlighted.last().is_some_and(|prev| prev.end > range.start) {
                continue;
            }
            highlighted.push(range);
        }

        Ok(Snippet {
            fragment: fragment.to_string(),
            highlighted,
        })
    }
}

/// Escape the characters HTML gives meaning to.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
