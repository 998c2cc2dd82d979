//! Raw tokenizer: the field value is the term.

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Emits the whole input as exactly one token, the empty string included.
///
/// Backs the `raw` analyzer used by STRING fields, where a delete or a
/// `field:term` query must name the stored value byte for byte.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawTokenizer;

impl RawTokenizer {
    pub fn new() -> Self {
        RawTokenizer
    }
}

impl Tokenizer for RawTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let token = Token::with_offsets(text, 0, 0, text.len());
        Ok(Box::new(std::iter::once(token)))
    }

    fn name(&self) -> &'static str {
        "raw"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_one_token() {
        let tokens: Vec<Token> = RawTokenizer::new().tokenize("978-0-14-018640-8").unwrap().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "978-0-14-018640-8");
        assert_eq!(tokens[0].end_offset, 17);
    }

    #[test]
    fn test_empty_value_is_still_a_term() {
        let tokens: Vec<Token> = RawTokenizer::new().tokenize("").unwrap().collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "");
    }
}
