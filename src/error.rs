//! Error taxonomy for the engine.
//!
//! Per-file problems (`ExtractError`, surfaced as `SkipReason`) are always
//! recovered at the pipeline boundary; only `EngineError::InvariantViolation`
//! is fatal, because it signals a logic defect rather than bad input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure while extracting structure from a single file.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Parse or pattern failure; the file is skipped, never the run.
    #[error("{file}: {message}")]
    Malformed { file: String, message: String },
}

/// Why a file contributed no structural units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "lowercase")]
pub enum SkipReason {
    /// No extractor wired for this language. Not an error.
    Unsupported { language: String },
    /// Extraction failed on this file.
    Malformed { message: String },
    /// The run deadline expired before this file was processed.
    Timeout,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unsupported { language } => {
                write!(f, "unsupported language: {}", language)
            }
            SkipReason::Malformed { message } => write!(f, "malformed: {}", message),
            SkipReason::Timeout => write!(f, "run deadline expired"),
        }
    }
}

/// Fatal engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An aggregation-time invariant does not hold (e.g. an unscored
    /// function). Aborts the run loudly instead of emitting a wrong report.
    #[error("aggregation invariant violated: {0}")]
    InvariantViolation(String),

    /// The bounded worker pool could not be constructed.
    #[error("worker pool: {0}")]
    Scheduler(String),
}
