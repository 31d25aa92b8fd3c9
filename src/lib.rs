//! codescope - multi-language structural extraction and usage-graph engine.
//!
//! codescope statically extracts structure (classes, functions, variables,
//! imports, complexity) from a heterogeneous source tree, then determines
//! which declared symbols are reachable from entry points versus dead, and
//! which files participate in dependency cycles.
//!
//! # Architecture
//!
//! - `inventory`: language detection and bounded file contents
//! - `model`: the normalized `StructuralUnit` shape all extractors emit
//! - `extract`: per-language extractors - grammar-driven (tree-sitter) and
//!   pattern-driven (regex tables) behind one interface
//! - `complexity`: branch tallies and lexical token scoring
//! - `usage`: definition/reference graph and reachability fixpoint
//! - `depgraph`: file dependency graph and cycle detection
//! - `sample`: head/middle/tail slices of oversized files
//! - `pipeline`: bounded fan-out and the single-threaded aggregation barrier
//! - `report`: JSON and terminal output
//!
//! Reachability here is a conservative heuristic over name matching, not a
//! compiler proof; the known limitations are documented on `usage`.
//!
//! # Adding a Language
//!
//! Add a query table (precise) or a pattern table (heuristic) under
//! `src/extract/languages/` and register it in `languages/mod.rs`.

pub mod cli;
pub mod complexity;
pub mod config;
pub mod depgraph;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod sample;
pub mod usage;

pub use config::{EngineConfig, EntryPointPolicy};
pub use error::{EngineError, ExtractError, SkipReason};
pub use extract::{extractor_for, Extraction, Extractor};
pub use inventory::{Language, SourceFile};
pub use model::{FileAnalysis, Scope, Span, StructuralUnit, UnitKind};
pub use report::AnalysisReport;
pub use usage::{DefKind, DefinitionRecord, UsageGraph};
