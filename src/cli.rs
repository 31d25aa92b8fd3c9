//! Command-line interface for codescope.
//!
//! The engine itself performs no traversal; this module is the inventory
//! collaborator. It walks the tree, applies ignore globs, reads files
//! under the byte ceiling, then hands the inventory to the pipeline.

use clap::{Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::inventory::{Language, SourceFile};
use crate::pipeline;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Multi-language structural extraction and usage-graph engine.
///
/// codescope extracts classes, functions, variables, and imports from a
/// mixed source tree, scores complexity, resolves which declared symbols
/// are reachable from entry points, and detects module dependency cycles.
#[derive(Parser)]
#[command(name = "codescope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a source tree
    #[command(visible_alias = "analyze")]
    Scan(ScanArgs),
    /// List recognized languages and their extraction mode
    Languages,
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Path to a YAML config file (default: built-in defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Worker count for the extraction fan-out (overrides config)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Whole-run timeout in seconds (overrides config)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Sample budget in lines for oversized files (overrides config)
    #[arg(short, long)]
    pub budget: Option<usize>,

    /// Exclude files whose path looks like a test
    #[arg(long)]
    pub skip_tests: bool,
}

/// Build the ignore matcher from config globs.
fn ignore_set(config: &EngineConfig) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in &config.ignore {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn looks_like_test(path: &Path) -> bool {
    let lowered = path.to_string_lossy().to_lowercase();
    lowered.contains("test") || lowered.contains("spec")
}

/// Collect candidate files under a root.
fn collect_files(root: &Path, config: &EngineConfig) -> anyhow::Result<Vec<PathBuf>> {
    let ignore = ignore_set(config)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).into_iter().filter_entry(|e| {
        let name = e.file_name().to_string_lossy();
        !(e.file_type().is_dir() && name.starts_with('.'))
    }) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if ignore.is_match(path) {
            continue;
        }
        if !config.include_tests && looks_like_test(path) {
            continue;
        }
        if Language::from_path(path) == Language::Other {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Read the inventory with a progress bar.
fn read_inventory(paths: &[PathBuf], config: &EngineConfig) -> Vec<SourceFile> {
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} reading {pos}/{len} {wide_bar}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut inventory = Vec::with_capacity(paths.len());
    for path in paths {
        bar.inc(1);
        match SourceFile::read(path, config.max_file_bytes) {
            Ok(file) => inventory.push(file),
            Err(e) => {
                bar.suspend(|| eprintln!("warning: cannot read {}: {}", path.display(), e));
            }
        }
    }
    bar.finish_and_clear();
    inventory
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let mut config = match &args.config {
        Some(path) => EngineConfig::parse_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.max_workers = workers;
    }
    if let Some(timeout) = args.timeout {
        config.run_timeout_secs = timeout;
    }
    if let Some(budget) = args.budget {
        config.sample_budget_lines = budget;
    }
    if args.skip_tests {
        config.include_tests = false;
    }
    config.validate()?;

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let paths = if metadata.is_dir() {
        collect_files(&args.path, &config)?
    } else {
        vec![args.path.clone()]
    };

    if paths.is_empty() {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    let inventory = read_inventory(&paths, &config);
    let result = pipeline::run(inventory, &config)?;

    match args.format.as_str() {
        "json" => println!("{}", report::write_json(&result)?),
        _ => report::write_pretty(&result),
    }

    if result.has_findings() {
        Ok(EXIT_FINDINGS)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the languages command.
pub fn run_languages() -> i32 {
    let rows: &[(&str, &str)] = &[
        ("python", "precise (grammar)"),
        ("java", "precise (grammar)"),
        ("go", "precise (grammar)"),
        ("rust", "precise (grammar)"),
        ("javascript", "heuristic (patterns)"),
        ("typescript", "heuristic (patterns)"),
        ("css", "heuristic (patterns)"),
        ("scss", "heuristic (patterns)"),
        ("html", "heuristic (patterns)"),
        ("sql", "recognized, not analyzed"),
        ("shell", "recognized, not analyzed"),
    ];

    println!("Supported languages:");
    println!();
    for (lang, mode) in rows {
        println!("  {:<12} {}", lang, mode);
    }

    EXIT_SUCCESS
}
