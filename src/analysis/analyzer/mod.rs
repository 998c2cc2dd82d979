//! Analyzers combine a tokenizer with a chain of token filters.
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → … → Filter N → Token Stream → Index
//! ```
//!
//! Fields name their analyzer through the `tokenizer` option of the schema
//! builder; [`registry::AnalyzerRegistry`] resolves those names.

pub mod pipeline;
pub mod registry;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync + std::fmt::Debug {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &str;
}

pub use pipeline::PipelineAnalyzer;
pub use registry::AnalyzerRegistry;
