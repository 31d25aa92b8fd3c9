//! File-level dependency graph and cycle detection.
//!
//! Import targets are resolved to project files by best-effort matching:
//! normalized path suffix first, then a file-stem match on the target's
//! last segment. Unresolved targets (external libraries) are recorded but
//! excluded from cycle detection. Edge extraction inherits the extractors'
//! heuristic error modes; cycle detection itself is exact over the edges it
//! is given.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{FileAnalysis, UnitKind};

/// An import that did not resolve to a project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalImport {
    pub file: String,
    pub target: String,
}

/// Directed graph over project files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub files: Vec<String>,
    /// Edges as (importer, imported) indices into `files`.
    pub edges: Vec<(usize, usize)>,
    pub external: Vec<ExternalImport>,
    /// Every distinct cycle, each listed as the participating file paths.
    pub cycles: Vec<Vec<String>>,
}

impl DependencyGraph {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Build the graph from per-file import units and detect cycles.
pub fn build(analyses: &[FileAnalysis]) -> DependencyGraph {
    let files: Vec<String> = analyses.iter().map(|a| a.file.path.clone()).collect();
    let index_of: HashMap<&str, usize> = files
        .iter()
        .enumerate()
        .map(|(i, p)| (p.as_str(), i))
        .collect();

    // Normalized comparison keys, extension stripped.
    let normalized: Vec<String> = files.iter().map(|p| normalize(strip_ext(p))).collect();
    let stems: Vec<String> = normalized
        .iter()
        .map(|n| n.rsplit('/').next().unwrap_or(n).to_string())
        .collect();

    let mut edges: Vec<(usize, usize)> = Vec::new();
    let mut edge_set: HashSet<(usize, usize)> = HashSet::new();
    let mut external: Vec<ExternalImport> = Vec::new();

    for analysis in analyses {
        let from = index_of[analysis.file.path.as_str()];
        for unit in &analysis.units {
            let target = match &unit.kind {
                UnitKind::Import { target } => target,
                _ => continue,
            };

            match resolve(target, &normalized, &stems) {
                Some(to) if to != from => {
                    if edge_set.insert((from, to)) {
                        edges.push((from, to));
                    }
                }
                Some(_) => {}
                None => external.push(ExternalImport {
                    file: analysis.file.path.clone(),
                    target: target.clone(),
                }),
            }
        }
    }

    let cycles = detect_cycles(files.len(), &edges)
        .into_iter()
        .map(|cycle| cycle.into_iter().map(|i| files[i].clone()).collect())
        .collect();

    DependencyGraph {
        files,
        edges,
        external,
        cycles,
    }
}

/// Resolve an import target to a project file index.
fn resolve(target: &str, normalized: &[String], stems: &[String]) -> Option<usize> {
    let norm = normalize(strip_ext(target.trim_start_matches("./")));
    if norm.is_empty() {
        return None;
    }

    // Exact or suffix path match first.
    let mut candidates: Vec<usize> = normalized
        .iter()
        .enumerate()
        .filter(|(_, path)| {
            *path == &norm || path.ends_with(&format!("/{}", norm))
        })
        .map(|(i, _)| i)
        .collect();

    // Fall back to matching the last segment against file stems.
    if candidates.is_empty() {
        let last = norm.rsplit('/').next().unwrap_or(&norm);
        candidates = stems
            .iter()
            .enumerate()
            .filter(|(_, stem)| stem.as_str() == last)
            .map(|(i, _)| i)
            .collect();
    }

    // Ambiguity is resolved deterministically: lowest index wins.
    candidates.into_iter().min()
}

/// Extensions stripped before matching. Only real source extensions:
/// stripping arbitrary trailing segments would mangle dotted module paths
/// like `pkg.util.helpers`.
const SOURCE_EXTS: &[&str] = &[
    "py", "java", "go", "rs", "js", "jsx", "mjs", "ts", "tsx", "mts", "css", "scss", "sass",
    "less", "html", "htm",
];

fn strip_ext(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() && SOURCE_EXTS.contains(&ext) => base,
        _ => path,
    }
}

/// Normalize separators: dots, double-colons, and backslashes all become '/'.
fn normalize(target: &str) -> String {
    target
        .replace("::", "/")
        .replace(['.', '\\'], "/")
        .trim_matches('/')
        .to_string()
}

const WHITE: u8 = 0;
const GRAY: u8 = 1;
const BLACK: u8 = 2;

/// Three-color DFS cycle enumeration.
///
/// Every back edge to a gray node yields the cycle currently on the stack;
/// cycles are deduplicated by membership so a ring is reported once no
/// matter where the traversal entered it.
fn detect_cycles(node_count: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        adjacency[from].push(to);
    }

    let mut color = vec![WHITE; node_count];
    let mut stack: Vec<usize> = Vec::new();
    let mut cycles: Vec<Vec<usize>> = Vec::new();
    let mut seen: HashSet<BTreeSet<usize>> = HashSet::new();

    fn visit(
        node: usize,
        adjacency: &[Vec<usize>],
        color: &mut [u8],
        stack: &mut Vec<usize>,
        cycles: &mut Vec<Vec<usize>>,
        seen: &mut HashSet<BTreeSet<usize>>,
    ) {
        color[node] = GRAY;
        stack.push(node);

        for &next in &adjacency[node] {
            match color[next] {
                WHITE => visit(next, adjacency, color, stack, cycles, seen),
                GRAY => {
                    let pos = stack
                        .iter()
                        .position(|&n| n == next)
                        .expect("gray node is on the stack");
                    let cycle: Vec<usize> = stack[pos..].to_vec();
                    let members: BTreeSet<usize> = cycle.iter().copied().collect();
                    if seen.insert(members) {
                        cycles.push(cycle);
                    }
                }
                _ => {}
            }
        }

        stack.pop();
        color[node] = BLACK;
    }

    for node in 0..node_count {
        if color[node] == WHITE {
            visit(node, &adjacency, &mut color, &mut stack, &mut cycles, &mut seen);
        }
    }

    cycles
}
