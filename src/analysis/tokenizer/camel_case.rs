//! Camel case and digit boundary tokenizer.
//!
//! Splits on non-alphanumeric characters and additionally on lower→upper case
//! transitions and letter↔digit transitions, which makes identifiers such as
//! `parseHTTPRequest2Fast` searchable by their parts.
//!
//! # Examples
//!
//! ```
//! use sarissa_jpc::analysis::tokenizer::Tokenizer;
//! use sarissa_jpc::analysis::tokenizer::camel_case::CamelCaseDigitTokenizer;
//!
//! let tokenizer = CamelCaseDigitTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("fooBar42baz").unwrap().collect();
//! let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["foo", "Bar", "42", "baz"]);
//! ```

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Tokenize text by splitting on punctuation, camel case and digit transitions.
#[derive(Clone, Debug, Default)]
pub struct CamelCaseDigitTokenizer;

impl CamelCaseDigitTokenizer {
    /// Create a new camel case tokenizer.
    pub fn new() -> Self {
        CamelCaseDigitTokenizer
    }

    /// Whether a token boundary sits between `prev` and `next`.
    fn is_transition(prev: char, next: char) -> bool {
        if next.is_uppercase() {
            prev.is_lowercase() || prev.is_ascii_digit()
        } else if next.is_ascii_digit() {
            !prev.is_ascii_digit()
        } else {
            prev.is_ascii_digit()
        }
    }
}

impl Tokenizer for CamelCaseDigitTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;
        let mut prev: Option<char> = None;

        for (offset, c) in text.char_indices() {
            if !c.is_alphanumeric() {
                if let Some(from) = start.take() {
                    tokens.push(Token::with_offsets(
                        &text[from..offset],
                        tokens.len(),
                        from,
                        offset,
                    ));
                }
                prev = None;
                continue;
            }

            match (start, prev) {
                (Some(from), Some(p)) if Self::is_transition(p, c) => {
                    tokens.push(Token::with_offsets(
                        &text[from..offset],
                        tokens.len(),
                        from,
                        offset,
                    ));
                    start = Some(offset);
                }
                (None, _) => start = Some(offset),
                _ => {}
            }
            prev = Some(c);
        }

        if let Some(from) = start {
            tokens.push(Token::with_offsets(
                &text[from..],
                tokens.len(),
                from,
                text.len(),
            ));
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "camel_case"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        CamelCaseDigitTokenizer::new()
            .tokenize(input)
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_camel_case_split() {
        assert_eq!(texts("TheOldMan"), vec!["The", "Old", "Man"]);
        assert_eq!(texts("ofMiceAndMen"), vec!["of", "Mice", "And", "Men"]);
    }

    #[test]
    fn test_digit_transitions() {
        assert_eq!(texts("abc123def"), vec!["abc", "123", "def"]);
        assert_eq!(texts("v2Beta"), vec!["v", "2", "Beta"]);
    }

    #[test]
    fn test_punctuation_and_offsets() {
        let tokens: Vec<Token> = CamelCaseDigitTokenizer::new()
            .tokenize("old_man-Sea")
            .unwrap()
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].text, "Sea");
        assert_eq!(tokens[2].start_offset, 8);
        assert_eq!(tokens[2].end_offset, 11);
        assert_eq!(tokens[2].position, 2);
    }

    #[test]
    fn test_acronym_stays_together() {
        assert_eq!(texts("HTTPServer"), vec!["HTTPServer"]);
    }
}
