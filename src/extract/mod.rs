//! Language extractors.
//!
//! One capability interface over two variants: grammar-driven precise
//! extraction (`treesitter`, feature-gated) and pattern-driven heuristic
//! extraction (`heuristic`). Adding a language means adding a query table
//! or a pattern table under `languages/`, never touching dispatch callers.

pub mod heuristic;
pub mod languages;

#[cfg(feature = "tree-sitter")]
pub mod treesitter;

use crate::config::EngineConfig;
use crate::error::ExtractError;
use crate::inventory::{Language, SourceFile};
use crate::model::StructuralUnit;

/// Result of extracting one file.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub units: Vec<StructuralUnit>,
    /// True when a heuristic extractor hit its line cap and only covered a
    /// prefix of the file.
    pub partial: bool,
}

/// One language extractor.
///
/// Extractors perform no I/O; content arrives pre-read and bounded.
pub trait Extractor: Send + Sync {
    /// The language this extractor handles.
    fn language(&self) -> Language;

    /// Extract all structural units from a file.
    fn extract(&self, file: &SourceFile) -> Result<Extraction, ExtractError>;
}

/// Build the extractor for a language, or None when unsupported.
///
/// Precise extractors require the `tree-sitter` feature; without it their
/// languages fall through to None and are recorded as unsupported skips.
pub fn extractor_for(language: Language, config: &EngineConfig) -> Option<Box<dyn Extractor>> {
    languages::extractor_for(language, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_language_has_no_extractor() {
        let config = EngineConfig::default();
        assert!(extractor_for(Language::Sql, &config).is_none());
        assert!(extractor_for(Language::Other, &config).is_none());
    }

    #[test]
    fn test_heuristic_languages_always_available() {
        let config = EngineConfig::default();
        for lang in [
            Language::JavaScript,
            Language::TypeScript,
            Language::Css,
            Language::Scss,
            Language::Html,
        ] {
            assert!(extractor_for(lang, &config).is_some(), "missing {}", lang);
        }
    }

    #[test]
    #[cfg(feature = "tree-sitter")]
    fn test_precise_languages_available_with_feature() {
        let config = EngineConfig::default();
        for lang in [
            Language::Python,
            Language::Java,
            Language::Go,
            Language::Rust,
        ] {
            assert!(extractor_for(lang, &config).is_some(), "missing {}", lang);
        }
    }
}
