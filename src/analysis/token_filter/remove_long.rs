//! Filter that drops overly long tokens.

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Default maximum token length in bytes.
pub const DEFAULT_MAX_TOKEN_LEN: usize = 40;

/// Removes tokens whose text is longer than a byte limit.
///
/// Base64 blobs and URLs pasted into text fields otherwise bloat the term
/// dictionary with terms nobody searches for.
#[derive(Clone, Debug)]
pub struct RemoveLongFilter {
    max_len: usize,
}

impl RemoveLongFilter {
    /// Create a filter with the given byte limit.
    pub fn new(max_len: usize) -> Self {
        RemoveLongFilter { max_len }
    }
}

impl Default for RemoveLongFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKEN_LEN)
    }
}

impl Filter for RemoveLongFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let max_len = self.max_len;
        Ok(Box::new(tokens.filter(move |token| token.len() <= max_len)))
    }

    fn name(&self) -> &'static str {
        "remove_long"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_remove_long_filter() {
        let filter = RemoveLongFilter::new(5);
        let tokens = vec![Token::new("short", 0), Token::new("toolong", 1)];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "short");
    }
}
