//! Stemming token filter and a suffix-stripping stemmer.

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    /// Stem a word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

/// Simple stemmer that removes common English suffixes, longest first.
#[derive(Debug, Clone)]
pub struct SimpleStemmer {
    /// Suffixes sorted by descending length.
    suffixes: Vec<&'static str>,
}

impl SimpleStemmer {
    /// Create a new simple stemmer.
    pub fn new() -> Self {
        let mut suffixes = vec![
            "ing", "ed", "er", "est", "ly", "s", "es", "ies", "ied", "tion", "sion", "able",
            "ible", "ment", "ness", "ful",
        ];
        suffixes.sort_by_key(|s| std::cmp::Reverse(s.len()));

        SimpleStemmer { suffixes }
    }
}

impl Default for SimpleStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stemmer for SimpleStemmer {
    fn stem(&self, word: &str) -> String {
        if word.len() <= 3 {
            return word.to_string();
        }

        for suffix in &self.suffixes {
            if word.len() > suffix.len() + 2 && word.ends_with(suffix) {
                return word[..word.len() - suffix.len()].to_string();
            }
        }

        word.to_string()
    }

    fn name(&self) -> &'static str {
        "simple"
    }
}

/// Filter that applies stemming to tokens.
pub struct StemFilter {
    stemmer: Box<dyn Stemmer>,
}

impl std::fmt::Debug for StemFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StemFilter")
            .field("stemmer", &self.stemmer.name())
            .finish()
    }
}

impl StemFilter {
    /// Create a stem filter with the simple stemmer.
    pub fn new() -> Self {
        StemFilter {
            stemmer: Box::new(SimpleStemmer::new()),
        }
    }

    /// Create a stem filter with a custom stemmer.
    pub fn with_stemmer(stemmer: Box<dyn Stemmer>) -> Self {
        StemFilter { stemmer }
    }
}

impl Default for StemFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StemFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stemmed: Vec<_> = tokens
            .map(|mut token| {
                if !token.is_stopped() {
                    token.text = self.stemmer.stem(&token.text);
                }
                token
            })
            .collect();

        Ok(Box::new(stemmed.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_simple_stemmer() {
        let stemmer = SimpleStemmer::new();

        assert_eq!(stemmer.stem("fished"), "fish");
        assert_eq!(stemmer.stem("taking"), "tak");
        assert_eq!(stemmer.stem("agreement"), "agree");
        assert_eq!(stemmer.stem("sea"), "sea");
        assert_eq!(stemmer.stem("days"), "day");
    }

    #[test]
    fn test_stem_filter() {
        let filter = StemFilter::new();
        let tokens = vec![Token::new("fishing", 0), Token::new("boats", 1)];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(result[0].text, "fish");
        assert_eq!(result[1].text, "boat");
    }
}
