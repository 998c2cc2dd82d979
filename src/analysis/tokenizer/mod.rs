//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first step of every analyzer: they split field text
//! into [`Token`](crate::analysis::token::Token)s with positions and byte
//! offsets.
//!
//! # Available Tokenizers
//!
//! - [`regex::RegexTokenizer`] - Runs of word characters (`\w+`), the default
//! - [`whitespace::WhitespaceTokenizer`] - Splits on whitespace characters
//! - [`unicode_word::UnicodeWordTokenizer`] - Uses Unicode word boundaries
//! - [`camel_case::CamelCaseDigitTokenizer`] - Splits camel case and digit runs
//! - [`raw::RawTokenizer`] - The whole value as one token

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod camel_case;
pub mod raw;
pub mod regex;
pub mod unicode_word;
pub mod whitespace;
