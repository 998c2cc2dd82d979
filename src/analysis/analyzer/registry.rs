//! Named analyzers available to schema fields.
//!
//! | Name | Pipeline |
//! |---|---|
//! | `default` | regex `\w+` → remove_long → lowercase |
//! | `raw` | whole input as one token |
//! | `whitespace` | whitespace → lowercase |
//! | `unicode` | UAX #29 words → remove_long → lowercase |
//! | `en_stem` | `default` → stem |
//! | `en_stem_with_stop_words` | `default` → stop → stem |
//! | `camel_case` | camel case / digit splits → lowercase |

use std::collections::HashMap;
use std::sync::Arc;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token_filter::{LowercaseFilter, RemoveLongFilter, StemFilter, StopFilter};
use crate::analysis::tokenizer::camel_case::CamelCaseDigitTokenizer;
use crate::analysis::tokenizer::raw::RawTokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::error::{JpcError, Result};

/// Name of the analyzer used when a text field names none.
pub const DEFAULT_ANALYZER: &str = "default";

/// Name of the analyzer used by STRING fields and non-text fields.
pub const RAW_ANALYZER: &str = "raw";

/// Registry of analyzers keyed by name.
#[derive(Debug, Clone)]
pub struct AnalyzerRegistry {
    analyzers: HashMap<String, Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    /// Create a registry holding the built-in analyzers.
    pub fn new() -> Result<Self> {
        let mut registry = AnalyzerRegistry {
            analyzers: HashMap::new(),
        };

        let regex = Arc::new(RegexTokenizer::new()?);
        let base = PipelineAnalyzer::new(regex)
            .add_filter(Arc::new(RemoveLongFilter::default()))
            .add_filter(Arc::new(LowercaseFilter::new()));

        registry.register(Arc::new(base.clone().with_name(DEFAULT_ANALYZER)));
        registry.register(Arc::new(
            PipelineAnalyzer::new(Arc::new(RawTokenizer::new())).with_name(RAW_ANALYZER),
        ));
        registry.register(Arc::new(
            PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
                .add_filter(Arc::new(LowercaseFilter::new()))
                .with_name("whitespace"),
        ));
        registry.register(Arc::new(
            PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
                .add_filter(Arc::new(RemoveLongFilter::default()))
                .add_filter(Arc::new(LowercaseFilter::new()))
                .with_name("unicode"),
        ));
        registry.register(Arc::new(
            base.clone()
                .add_filter(Arc::new(StemFilter::new()))
                .with_name("en_stem"),
        ));
        registry.register(Arc::new(
            base.add_filter(Arc::new(StopFilter::new()))
                .add_filter(Arc::new(StemFilter::new()))
                .with_name("en_stem_with_stop_words"),
        ));
        registry.register(Arc::new(
            PipelineAnalyzer::new(Arc::new(CamelCaseDigitTokenizer::new()))
                .add_filter(Arc::new(LowercaseFilter::new()))
                .with_name("camel_case"),
        ));

        Ok(registry)
    }

    /// Register an analyzer under its own name, replacing any previous one.
    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzers.insert(analyzer.name().to_string(), analyzer);
    }

    /// Look up an analyzer by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Analyzer>> {
        self.analyzers
            .get(name)
            .cloned()
            .ok_or_else(|| JpcError::schema(format!("unknown tokenizer {name}")))
    }

    /// Check whether an analyzer is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.analyzers.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(registry: &AnalyzerRegistry, name: &str, text: &str) -> Vec<String> {
        registry
            .get(name)
            .unwrap()
            .analyze(text)
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_builtin_analyzers() {
        let registry = AnalyzerRegistry::new().unwrap();

        assert_eq!(
            analyze(&registry, "default", "The Old Man and the Sea"),
            vec!["the", "old", "man", "and", "the", "sea"]
        );
        assert_eq!(
            analyze(&registry, "en_stem_with_stop_words", "The Old Man and the Sea"),
            vec!["old", "man", "sea"]
        );
        assert_eq!(analyze(&registry, "raw", "Old Man"), vec!["Old Man"]);
        assert_eq!(
            analyze(&registry, "camel_case", "OldManSea"),
            vec!["old", "man", "sea"]
        );
    }

    #[test]
    fn test_unknown_analyzer() {
        let registry = AnalyzerRegistry::new().unwrap();
        assert!(registry.get("klingon").is_err());
        assert!(registry.contains("en_stem"));
    }
}
