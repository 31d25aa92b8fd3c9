//! Report assembly and output formatting.
//!
//! The `AnalysisReport` is the engine's single output value: per-file
//! structural units with complexity scores, project-wide unused
//! definitions, dependency cycles, samples for oversized files, and the
//! skip list. It serializes losslessly to schema-stable JSON; the pretty
//! writer renders the same data for terminals.

use std::collections::BTreeMap;

use colored::*;
use serde::{Deserialize, Serialize};

use crate::depgraph::{DependencyGraph, ExternalImport};
use crate::inventory::Language;
use crate::model::{flatten, FileAnalysis, StructuralUnit, UnitKind};
use crate::pipeline::FileOutcome;
use crate::sample::Sample;
use crate::usage::{DefinitionRecord, UsageGraph};

/// Project-wide totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub total_classes: usize,
    pub total_functions: usize,
    pub total_variables: usize,
    pub total_imports: usize,
    pub average_complexity: f64,
    pub language_distribution: BTreeMap<String, usize>,
    /// True when the run deadline expired before every file was processed.
    pub incomplete: bool,
}

/// One analyzed file with its extracted units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    pub language: Language,
    pub size: u64,
    pub lines: usize,
    pub partial: bool,
    pub truncated: bool,
    pub units: Vec<StructuralUnit>,
}

/// One row of the most-complex-functions listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityEntry {
    pub qualified_name: String,
    pub file: String,
    pub line: usize,
    pub complexity: u32,
}

/// The engine's aggregate output value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileReport>,
    pub unused_definitions: Vec<DefinitionRecord>,
    pub most_complex: Vec<ComplexityEntry>,
    pub dependency_cycles: Vec<Vec<String>>,
    pub external_imports: Vec<ExternalImport>,
    pub samples: Vec<Sample>,
    /// Files that contributed nothing, with reasons; always present so
    /// data loss is never silent.
    pub skipped: Vec<FileOutcome>,
}

/// How many most-complex entries the report keeps.
const MOST_COMPLEX_LIMIT: usize = 10;

impl AnalysisReport {
    pub fn assemble(
        analyses: Vec<FileAnalysis>,
        outcomes: Vec<FileOutcome>,
        usage: UsageGraph,
        dependencies: DependencyGraph,
        samples: Vec<Sample>,
        incomplete: bool,
    ) -> Self {
        let mut total_classes = 0;
        let mut total_functions = 0;
        let mut total_variables = 0;
        let mut total_imports = 0;
        let mut complexity_sum: u64 = 0;
        let mut language_distribution: BTreeMap<String, usize> = BTreeMap::new();

        for analysis in &analyses {
            *language_distribution
                .entry(analysis.file.language.tag().to_string())
                .or_default() += 1;
            for unit in flatten(&analysis.units) {
                match &unit.kind {
                    UnitKind::Class { .. } => total_classes += 1,
                    UnitKind::Function { complexity, .. } => {
                        total_functions += 1;
                        complexity_sum += u64::from(*complexity);
                    }
                    UnitKind::Variable { .. } => total_variables += 1,
                    UnitKind::Import { .. } => total_imports += 1,
                }
            }
        }

        let average_complexity = if total_functions > 0 {
            round2(complexity_sum as f64 / total_functions as f64)
        } else {
            0.0
        };

        let mut most_complex: Vec<ComplexityEntry> = usage
            .definitions
            .iter()
            .filter_map(|d| {
                d.complexity.map(|c| ComplexityEntry {
                    qualified_name: d.qualified_name.clone(),
                    file: d.file.clone(),
                    line: d.line,
                    complexity: c,
                })
            })
            .collect();
        most_complex.sort_by(|a, b| {
            b.complexity
                .cmp(&a.complexity)
                .then_with(|| a.file.cmp(&b.file))
                .then_with(|| a.qualified_name.cmp(&b.qualified_name))
        });
        most_complex.truncate(MOST_COMPLEX_LIMIT);

        let files: Vec<FileReport> = analyses
            .into_iter()
            .map(|a| FileReport {
                path: a.file.path.clone(),
                language: a.file.language,
                size: a.file.size,
                lines: a.file.line_count(),
                truncated: a.file.truncated(),
                partial: a.partial,
                units: a.units,
            })
            .collect();

        let skipped: Vec<FileOutcome> = outcomes.into_iter().filter(|o| o.skip.is_some()).collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            summary: Summary {
                files_scanned: files.len(),
                files_skipped: skipped.len(),
                total_classes,
                total_functions,
                total_variables,
                total_imports,
                average_complexity,
                language_distribution,
                incomplete,
            },
            files,
            unused_definitions: usage.unused_definitions(),
            most_complex,
            dependency_cycles: dependencies.cycles,
            external_imports: dependencies.external,
            samples,
            skipped,
        }
    }

    /// Whether the report contains findings a caller would gate on.
    pub fn has_findings(&self) -> bool {
        !self.unused_definitions.is_empty() || !self.dependency_cycles.is_empty()
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Serialize the report as pretty JSON.
pub fn write_json(report: &AnalysisReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render the report for a terminal.
pub fn write_pretty(report: &AnalysisReport) {
    let s = &report.summary;

    println!("{}", "codescope analysis".bold());
    println!();
    println!(
        "  files: {} scanned, {} skipped{}",
        s.files_scanned,
        s.files_skipped,
        if s.incomplete {
            "  (incomplete run)".yellow().to_string()
        } else {
            String::new()
        }
    );
    println!(
        "  units: {} classes, {} functions, {} variables, {} imports",
        s.total_classes, s.total_functions, s.total_variables, s.total_imports
    );
    println!("  average complexity: {:.2}", s.average_complexity);

    if !s.language_distribution.is_empty() {
        let langs: Vec<String> = s
            .language_distribution
            .iter()
            .map(|(lang, count)| format!("{} ({})", lang, count))
            .collect();
        println!("  languages: {}", langs.join(", "));
    }

    println!();
    if report.unused_definitions.is_empty() {
        println!("{}", "no unused definitions".green());
    } else {
        println!(
            "{}",
            format!("{} unused definitions", report.unused_definitions.len()).red()
        );
        for def in &report.unused_definitions {
            println!(
                "  {} {} {}:{}",
                def.kind.to_string().dimmed(),
                def.qualified_name,
                def.file,
                def.line
            );
        }
    }

    println!();
    if report.dependency_cycles.is_empty() {
        println!("{}", "no dependency cycles".green());
    } else {
        println!(
            "{}",
            format!("{} dependency cycles", report.dependency_cycles.len()).red()
        );
        for cycle in &report.dependency_cycles {
            println!("  {}", cycle.join(" -> "));
        }
    }

    if !report.most_complex.is_empty() {
        println!();
        println!("{}", "most complex functions".bold());
        for entry in &report.most_complex {
            println!(
                "  {:>4}  {} ({}:{})",
                entry.complexity, entry.qualified_name, entry.file, entry.line
            );
        }
    }

    if !report.samples.is_empty() {
        println!();
        println!(
            "{} oversized files sampled for summarization",
            report.samples.len()
        );
    }

    // The skip section always prints, so data loss is never silent.
    println!();
    if report.skipped.is_empty() {
        println!("files skipped: none");
    } else {
        println!(
            "{}",
            format!("files skipped: {}", report.skipped.len()).yellow()
        );
        for outcome in &report.skipped {
            if let Some(reason) = &outcome.skip {
                println!("  {}: {}", outcome.path, reason);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::inventory::SourceFile;
    use crate::pipeline;

    fn report_for(files: Vec<SourceFile>) -> AnalysisReport {
        pipeline::run(files, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_json_round_trip() {
        let report = report_for(vec![
            SourceFile::new(
                "a.js",
                Language::JavaScript,
                "function main() { helper(); }\nfunction helper() { return 1; }\nfunction dead() {}\n",
            ),
            SourceFile::new("schema.sql", Language::Sql, "SELECT 1;"),
        ]);

        let json = write_json(&report).unwrap();
        let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.summary.files_scanned, report.summary.files_scanned);
        assert_eq!(
            parsed.unused_definitions.len(),
            report.unused_definitions.len()
        );
        assert_eq!(parsed.skipped.len(), 1);
    }

    #[test]
    fn test_every_definition_carries_reachability() {
        let report = report_for(vec![SourceFile::new(
            "a.js",
            Language::JavaScript,
            "function main() {}\nfunction dead() {}\n",
        )]);

        let json = write_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for def in value["unused_definitions"].as_array().unwrap() {
            assert!(def.get("reachable").is_some());
            assert_eq!(def["reachable"], serde_json::Value::Bool(false));
        }
    }

    #[test]
    fn test_summary_counts() {
        let report = report_for(vec![SourceFile::new(
            "a.js",
            Language::JavaScript,
            "import x from 'pkg';\nclass Widget {}\nfunction main() {}\nconst limit = 3;\n",
        )]);

        assert_eq!(report.summary.total_classes, 1);
        assert_eq!(report.summary.total_functions, 1);
        assert_eq!(report.summary.total_variables, 1);
        assert_eq!(report.summary.total_imports, 1);
        assert_eq!(
            report.summary.language_distribution.get("javascript"),
            Some(&1)
        );
        assert!(report.summary.average_complexity >= 1.0);
    }
}
