//! Per-language extractor tables.
//!
//! Heuristic tables are always available; grammar configurations require
//! the `tree-sitter` feature. Adding a language means adding a module here
//! and one dispatch arm - callers never change.

pub mod html;
pub mod javascript;
pub mod stylesheet;

#[cfg(feature = "tree-sitter")]
pub mod go;
#[cfg(feature = "tree-sitter")]
pub mod java;
#[cfg(feature = "tree-sitter")]
pub mod python;
#[cfg(feature = "tree-sitter")]
pub mod rust_lang;

use super::heuristic::HeuristicExtractor;
use super::Extractor;
#[cfg(feature = "tree-sitter")]
use super::treesitter::PreciseExtractor;
use crate::config::EngineConfig;
use crate::inventory::Language;

/// Build the extractor for a language.
///
/// Returns None for languages without a wired extractor (including the
/// grammar-backed ones when the `tree-sitter` feature is disabled); callers
/// record those files as unsupported skips.
pub fn extractor_for(language: Language, config: &EngineConfig) -> Option<Box<dyn Extractor>> {
    let cap = config.heuristic_line_cap;
    match language {
        Language::JavaScript => Some(Box::new(HeuristicExtractor::new(
            &javascript::JAVASCRIPT_TABLE,
            cap,
        ))),
        Language::TypeScript => Some(Box::new(HeuristicExtractor::new(
            &javascript::TYPESCRIPT_TABLE,
            cap,
        ))),
        Language::Css => Some(Box::new(HeuristicExtractor::new(&stylesheet::CSS_TABLE, cap))),
        Language::Scss => Some(Box::new(HeuristicExtractor::new(
            &stylesheet::SCSS_TABLE,
            cap,
        ))),
        Language::Html => Some(Box::new(HeuristicExtractor::new(&html::HTML_TABLE, cap))),
        #[cfg(feature = "tree-sitter")]
        Language::Python => Some(Box::new(PreciseExtractor::new(python::grammar()))),
        #[cfg(feature = "tree-sitter")]
        Language::Java => Some(Box::new(PreciseExtractor::new(java::grammar()))),
        #[cfg(feature = "tree-sitter")]
        Language::Go => Some(Box::new(PreciseExtractor::new(go::grammar()))),
        #[cfg(feature = "tree-sitter")]
        Language::Rust => Some(Box::new(PreciseExtractor::new(rust_lang::grammar()))),
        _ => None,
    }
}
