//! Pipeline orchestration: bounded fan-out, then single-threaded aggregation.
//!
//! Each worker takes one file end-to-end (extract, score, collect
//! references) with no shared mutable state; per-file definition and
//! reference sets are merged afterwards by the single aggregation thread,
//! which is why no locking appears anywhere in this module. Aggregation is
//! a strict barrier: reachability and cycle detection are only correct
//! over the complete definition table.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::complexity;
use crate::config::EngineConfig;
use crate::depgraph;
use crate::error::{EngineError, ExtractError, SkipReason};
use crate::extract;
use crate::inventory::SourceFile;
use crate::model::{flatten, FileAnalysis, UnitKind};
use crate::report::AnalysisReport;
use crate::sample;
use crate::usage;

/// Per-file pipeline state. Terminal states are `Aggregated` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Pending,
    Reading,
    Extracting,
    Scored,
    Aggregated,
    Failed,
}

/// Terminal record for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: String,
    pub state: FileState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<SkipReason>,
}

/// Run the whole pipeline over a pre-built inventory.
///
/// Per-file failures are recovered and surfaced in the report's skip list;
/// only aggregation invariant violations abort the run.
pub fn run(inventory: Vec<SourceFile>, config: &EngineConfig) -> Result<AnalysisReport, EngineError> {
    let deadline = match config.run_timeout_secs {
        0 => None,
        secs => Instant::now().checked_add(Duration::from_secs(secs)),
    };

    let results: Vec<(FileOutcome, Option<FileAnalysis>)> = if config.max_workers == 0 {
        inventory
            .par_iter()
            .map(|file| process_file(file, config, deadline))
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_workers)
            .build()
            .map_err(|e| EngineError::Scheduler(e.to_string()))?;
        pool.install(|| {
            inventory
                .par_iter()
                .map(|file| process_file(file, config, deadline))
                .collect()
        })
    };

    aggregate(results, config)
}

/// One worker's end-to-end pass over a single file.
fn process_file(
    file: &SourceFile,
    config: &EngineConfig,
    deadline: Option<Instant>,
) -> (FileOutcome, Option<FileAnalysis>) {
    if let Some(deadline) = deadline {
        if Instant::now() >= deadline {
            return (
                FileOutcome {
                    path: file.path.clone(),
                    state: FileState::Failed,
                    skip: Some(SkipReason::Timeout),
                },
                None,
            );
        }
    }

    // No extractor wired: the file completes the pipeline contributing
    // zero units. A skip reason, not an error.
    let extractor = match extract::extractor_for(file.language, config) {
        Some(e) => e,
        None => {
            return (
                FileOutcome {
                    path: file.path.clone(),
                    state: FileState::Aggregated,
                    skip: Some(SkipReason::Unsupported {
                        language: file.language.tag().to_string(),
                    }),
                },
                None,
            );
        }
    };

    let mut extraction = match extractor.extract(file) {
        Ok(e) => e,
        Err(ExtractError::Malformed { message, .. }) => {
            return (
                FileOutcome {
                    path: file.path.clone(),
                    state: FileState::Failed,
                    skip: Some(SkipReason::Malformed { message }),
                },
                None,
            );
        }
    };

    // Scoring pass: fill every function's complexity exactly once.
    for unit in &mut extraction.units {
        unit.walk_mut(&mut |u| {
            if let UnitKind::Function {
                body,
                branches,
                complexity: score_slot,
                ..
            } = &mut u.kind
            {
                *score_slot = match *branches {
                    Some(n) => complexity::score_branches(n),
                    None => match *body {
                        Some(span) => complexity::score_tokens(&span.text(file)),
                        None => 1,
                    },
                };
            }
        });
    }
    let references = usage::collect_references(file, &extraction.units);

    // Aggregation promotes this to the Aggregated terminal state.
    (
        FileOutcome {
            path: file.path.clone(),
            state: FileState::Scored,
            skip: None,
        },
        Some(FileAnalysis {
            file: file.clone(),
            units: extraction.units,
            references,
            partial: extraction.partial,
        }),
    )
}

/// The single-threaded barrier stage.
fn aggregate(
    results: Vec<(FileOutcome, Option<FileAnalysis>)>,
    config: &EngineConfig,
) -> Result<AnalysisReport, EngineError> {
    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(results.len());
    let mut analyses: Vec<FileAnalysis> = Vec::new();

    for (mut outcome, analysis) in results {
        if let Some(analysis) = analysis {
            outcome.state = FileState::Aggregated;
            analyses.push(analysis);
        }
        outcomes.push(outcome);
    }

    // Deterministic output regardless of scheduling.
    analyses.sort_by(|a, b| a.file.path.cmp(&b.file.path));
    outcomes.sort_by(|a, b| a.path.cmp(&b.path));

    // Every function must have been scored before aggregation; an unscored
    // one is a logic defect, not a data problem.
    for analysis in &analyses {
        for unit in flatten(&analysis.units) {
            if let UnitKind::Function { complexity, .. } = &unit.kind {
                if *complexity < 1 {
                    return Err(EngineError::InvariantViolation(format!(
                        "function {} in {} reached aggregation unscored",
                        unit.name, unit.file
                    )));
                }
            }
        }
    }

    let usage_graph = usage::build(&analyses, &config.entry_points);
    let dependency_graph = depgraph::build(&analyses);

    let samples: Vec<sample::Sample> = analyses
        .iter()
        .filter_map(|a| sample::sample(&a.file, &a.units, config.sample_budget_lines))
        .collect();

    let incomplete = outcomes
        .iter()
        .any(|o| matches!(o.skip, Some(SkipReason::Timeout)));

    Ok(AnalysisReport::assemble(
        analyses,
        outcomes,
        usage_graph,
        dependency_graph,
        samples,
        incomplete,
    ))
}
