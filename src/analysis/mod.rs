//! Text analysis: tokenizers, token filters and analyzers.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, AnalyzerRegistry, PipelineAnalyzer};
pub use token::{Token, TokenStream};
