//! Project-wide usage graph: definitions, references, reachability.
//!
//! Definitions come from every Class/Function/Variable unit; references are
//! bare identifier tokens observed in bodies and at file top level.
//! Matching is by name (plus the owning-class hint for constructors), not
//! compiler-grade binding: two same-named symbols in unrelated scopes
//! cannot be told apart, so a reference to either marks both used. That
//! false-negative direction is accepted and documented rather than papered
//! over with scope rules the data cannot support.

use std::collections::{HashMap, HashSet, VecDeque};

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::EntryPointPolicy;
use crate::inventory::SourceFile;
use crate::model::{FileAnalysis, RawReference, Scope, StructuralUnit, UnitKind};

/// Definition kinds tracked by the usage graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefKind {
    Class,
    Function,
    Variable,
}

impl std::fmt::Display for DefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefKind::Class => write!(f, "class"),
            DefKind::Function => write!(f, "function"),
            DefKind::Variable => write!(f, "variable"),
        }
    }
}

/// One declared symbol. Keyed by (qualified_name, file, kind); duplicates
/// across files are expected and kept as separate records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionRecord {
    pub qualified_name: String,
    pub name: String,
    pub kind: DefKind,
    pub file: String,
    pub line: usize,
    pub scope: Scope,
    /// Always present in serialized output; false until the reachability
    /// pass marks it.
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u32>,
}

/// One observed use-site, resolved lazily by name matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub name: String,
    pub file: String,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclosing: Option<String>,
}

/// The bipartite definitions/references structure after the fixpoint pass.
#[derive(Debug, Clone)]
pub struct UsageGraph {
    pub definitions: Vec<DefinitionRecord>,
    pub references: Vec<ReferenceRecord>,
}

impl UsageGraph {
    /// Definitions never marked reachable.
    pub fn unused_definitions(&self) -> Vec<DefinitionRecord> {
        self.definitions
            .iter()
            .filter(|d| !d.reachable)
            .cloned()
            .collect()
    }
}

/// Tokens that are language keywords in at least one supported language;
/// never recorded as references.
static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "if", "else", "elif", "for", "while", "do", "switch", "case", "default",
    "break", "continue", "return", "function", "def", "class", "const",
    "let", "var", "new", "this", "self", "super", "import", "from",
    "export", "static", "public", "private", "protected", "final", "void",
    "int", "float", "double", "boolean", "string", "true", "false", "None",
    "null", "nil", "not", "and", "or", "in", "of", "try", "except",
    "catch", "finally", "raise", "throw", "throws", "async", "await",
    "yield", "match", "with", "as", "pass", "lambda", "package", "chan",
    "map", "struct", "interface", "type", "impl", "fn", "mut", "pub",
    "use", "mod", "crate", "enum", "trait", "where", "loop", "ref", "go",
    "extends", "implements", "instanceof", "typeof", "delete", "require",
};

lazy_static! {
    static ref CODE_IDENT: Regex = Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").unwrap();
    static ref STYLE_IDENT: Regex = Regex::new(r"(?:--|\$)?[A-Za-z_][A-Za-z0-9_-]*").unwrap();
}

/// Collect raw references from one file's content.
///
/// Every identifier token counts except keywords and tokens sitting on the
/// declaration line of a same-named unit. Each reference carries the
/// qualified name of its innermost enclosing declared unit; top-level
/// references carry None and act as roots (file scope executes on load).
pub fn collect_references(file: &SourceFile, units: &[StructuralUnit]) -> Vec<RawReference> {
    let mut decl_sites: HashSet<(String, usize)> = HashSet::new();
    let mut enclosures: Vec<(usize, usize, String)> = Vec::new();

    for_each_definition(units, &mut |unit, chain| {
        decl_sites.insert((unit.name.clone(), unit.span.start_line));
        if matches!(
            unit.kind,
            UnitKind::Class { .. } | UnitKind::Function { .. }
        ) {
            enclosures.push((
                unit.span.start_line,
                unit.span.end_line,
                qualify(chain, &unit.name),
            ));
        }
    });

    let ident: &Regex = if file.language.is_stylesheet() {
        &STYLE_IDENT
    } else {
        &CODE_IDENT
    };

    let mut out = Vec::new();
    let mut seen: HashSet<(String, usize)> = HashSet::new();

    for (idx, line) in file.content.lines().enumerate() {
        let line_no = idx + 1;
        for m in ident.find_iter(line) {
            let token = m.as_str();
            if KEYWORDS.contains(token) {
                continue;
            }
            if decl_sites.contains(&(token.to_string(), line_no)) {
                continue;
            }
            if !seen.insert((token.to_string(), line_no)) {
                continue;
            }

            let enclosing = enclosures
                .iter()
                .filter(|(start, end, _)| line_no >= *start && line_no <= *end)
                .min_by_key(|(start, end, _)| end - start)
                .map(|(_, _, qname)| qname.clone());

            out.push(RawReference {
                name: token.to_string(),
                line: line_no,
                enclosing,
            });
        }
    }

    out
}

/// Build the usage graph and run the reachability fixpoint.
pub fn build(analyses: &[FileAnalysis], policy: &EntryPointPolicy) -> UsageGraph {
    let mut definitions: Vec<DefinitionRecord> = Vec::new();
    let mut name_index: HashMap<String, Vec<usize>> = HashMap::new();

    for analysis in analyses {
        for_each_definition(&analysis.units, &mut |unit, chain| {
            let (kind, complexity) = match &unit.kind {
                UnitKind::Class { .. } => (DefKind::Class, None),
                UnitKind::Function { complexity, .. } => (DefKind::Function, Some(*complexity)),
                UnitKind::Variable { .. } => (DefKind::Variable, None),
                UnitKind::Import { .. } => return,
            };

            let idx = definitions.len();
            definitions.push(DefinitionRecord {
                qualified_name: qualify(chain, &unit.name),
                name: unit.name.clone(),
                kind,
                file: unit.file.clone(),
                line: unit.span.start_line,
                scope: unit.scope,
                reachable: false,
                complexity,
            });
            name_index.entry(unit.name.clone()).or_default().push(idx);
        });
    }

    // Index references by their enclosing definition; top-level references
    // become roots.
    let mut refs_by_encl: HashMap<(String, String), Vec<String>> = HashMap::new();
    let mut root_names: Vec<String> = Vec::new();
    let mut references: Vec<ReferenceRecord> = Vec::new();

    for analysis in analyses {
        for r in &analysis.references {
            references.push(ReferenceRecord {
                name: r.name.clone(),
                file: analysis.file.path.clone(),
                line: r.line,
                enclosing: r.enclosing.clone(),
            });
            match &r.enclosing {
                Some(qname) => refs_by_encl
                    .entry((analysis.file.path.clone(), qname.clone()))
                    .or_default()
                    .push(r.name.clone()),
                None => root_names.push(r.name.clone()),
            }
        }
    }

    // Seed: entry-point matches, then targets of top-level references.
    let mut queue: VecDeque<usize> = VecDeque::new();

    for (idx, def) in definitions.iter_mut().enumerate() {
        let owner = owner_of(&def.qualified_name);
        if policy.matches(&def.name, owner) {
            def.reachable = true;
            queue.push_back(idx);
        }
    }

    for name in &root_names {
        if let Some(indices) = name_index.get(name) {
            for &idx in indices {
                if !definitions[idx].reachable {
                    definitions[idx].reachable = true;
                    queue.push_back(idx);
                }
            }
        }
    }

    // Propagate to a fixed point over "reference plausibly targets
    // definition" edges.
    while let Some(idx) = queue.pop_front() {
        let key = (
            definitions[idx].file.clone(),
            definitions[idx].qualified_name.clone(),
        );
        let Some(names) = refs_by_encl.get(&key) else {
            continue;
        };
        for name in names {
            if let Some(indices) = name_index.get(name) {
                for &target in indices {
                    if !definitions[target].reachable {
                        definitions[target].reachable = true;
                        queue.push_back(target);
                    }
                }
            }
        }
    }

    UsageGraph {
        definitions,
        references,
    }
}

/// Walk a unit forest calling `f` with each definition and its owner chain.
fn for_each_definition<'a>(
    units: &'a [StructuralUnit],
    f: &mut dyn FnMut(&'a StructuralUnit, &[String]),
) {
    fn go<'a>(
        unit: &'a StructuralUnit,
        chain: &mut Vec<String>,
        f: &mut dyn FnMut(&'a StructuralUnit, &[String]),
    ) {
        f(unit, chain);
        if !unit.children().is_empty() {
            chain.push(unit.name.clone());
            for child in unit.children() {
                go(child, chain, f);
            }
            chain.pop();
        }
    }

    let mut chain = Vec::new();
    for unit in units {
        go(unit, &mut chain, f);
    }
}

fn qualify(chain: &[String], name: &str) -> String {
    if chain.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", chain.join("."), name)
    }
}

/// The owning container's bare name, from a qualified name.
fn owner_of(qualified: &str) -> Option<&str> {
    let (owners, _) = qualified.rsplit_once('.')?;
    owners.rsplit('.').next()
}
