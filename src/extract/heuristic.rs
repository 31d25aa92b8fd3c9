//! Heuristic pattern-table extraction.
//!
//! For languages without a wired grammar, structure is recovered from an
//! ordered list of compiled regex patterns applied over a capped prefix of
//! the file. This trades completeness for speed: when the cap is hit the
//! result is flagged `partial`. Pattern order matters - specific forms
//! (exported functions, arrow bindings) run before generic fallbacks so the
//! same declaration is never counted under two kinds; any remaining overlap
//! is deduplicated by `(name, start_line)`.

use once_cell::sync::OnceCell;
use phf::phf_set;
use regex::Regex;

use super::{Extraction, Extractor};
use crate::error::ExtractError;
use crate::inventory::{Language, SourceFile};
use crate::model::{Scope, Span, StructuralUnit, UnitKind};

/// Which unit kind a pattern produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Class,
    Function,
    Variable,
    Import,
}

/// One uncompiled pattern row in a language table.
pub struct PatternSpec {
    pub kind: PatternKind,
    pub pattern: &'static str,
    /// Capture group holding the declared name (or import target).
    pub name_group: usize,
    /// Capture group holding the parameter list text (functions only).
    pub params_group: Option<usize>,
    /// Fixed declared-type label for variables (e.g. "custom-property").
    pub declared_type: Option<&'static str>,
    /// Capture group holding the declared type, overriding `declared_type`.
    pub type_group: Option<usize>,
    /// Reject matches whose name is a control-flow keyword. Needed by
    /// generic method-shorthand fallbacks like `name(args) {`.
    pub filter_keywords: bool,
}

impl PatternSpec {
    /// Shorthand for the common case: kind, pattern, name group.
    pub const fn simple(kind: PatternKind, pattern: &'static str, name_group: usize) -> Self {
        Self {
            kind,
            pattern,
            name_group,
            params_group: None,
            declared_type: None,
            type_group: None,
            filter_keywords: false,
        }
    }
}

/// Names the generic method fallback must never claim.
static CONTROL_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "if", "else", "for", "while", "switch", "catch", "return", "do",
    "new", "typeof", "await", "yield", "function", "delete", "in", "of",
};

/// A static language table. Regexes are compiled once per process on
/// first use and cached in the table itself.
pub struct PatternTable {
    pub language: Language,
    pub patterns: &'static [PatternSpec],
    /// Line prefixes treated as comments and skipped.
    pub comment_prefixes: &'static [&'static str],
    pub compiled: OnceCell<Vec<Regex>>,
}

impl PatternTable {
    fn regexes(&self) -> &[Regex] {
        // Pattern strings are static and covered by the table's own tests,
        // so a compile failure is a programming error.
        self.compiled.get_or_init(|| {
            self.patterns
                .iter()
                .map(|spec| {
                    Regex::new(spec.pattern)
                        .unwrap_or_else(|e| panic!("bad pattern for {}: {}", self.language, e))
                })
                .collect()
        })
    }
}

/// Pattern-driven extractor for one language.
pub struct HeuristicExtractor {
    table: &'static PatternTable,
    line_cap: usize,
}

impl HeuristicExtractor {
    pub fn new(table: &'static PatternTable, line_cap: usize) -> Self {
        Self { table, line_cap }
    }

    fn is_comment(&self, trimmed: &str) -> bool {
        self.table
            .comment_prefixes
            .iter()
            .any(|p| trimmed.starts_with(p))
    }
}

/// A flat match before extent inference and nesting.
struct RawUnit {
    name: String,
    kind: PatternKind,
    line: usize,
    indent: usize,
    parameter_count: usize,
    declared_type: String,
    target: String,
}

impl Extractor for HeuristicExtractor {
    fn language(&self) -> Language {
        self.table.language
    }

    fn extract(&self, file: &SourceFile) -> Result<Extraction, ExtractError> {
        let mut raw: Vec<RawUnit> = Vec::new();
        let mut claimed: std::collections::HashSet<(String, usize)> = std::collections::HashSet::new();

        let regexes = self.table.regexes();
        let mut scanned = 0usize;
        let mut capped = false;

        for (idx, line) in file.content.lines().enumerate() {
            if idx >= self.line_cap {
                capped = true;
                break;
            }
            scanned = idx + 1;

            let trimmed = line.trim_start();
            if trimmed.is_empty() || self.is_comment(trimmed) {
                continue;
            }
            let indent = line.len() - trimmed.len();

            for (spec, regex) in self.table.patterns.iter().zip(regexes) {
                for caps in regex.captures_iter(line) {
                    let name = match caps.get(spec.name_group) {
                        Some(m) => m.as_str().to_string(),
                        None => continue,
                    };
                    if name.is_empty() {
                        continue;
                    }
                    if spec.filter_keywords && CONTROL_KEYWORDS.contains(name.as_str()) {
                        continue;
                    }
                    if !claimed.insert((name.clone(), idx + 1)) {
                        continue;
                    }

                    let parameter_count = spec
                        .params_group
                        .and_then(|g| caps.get(g))
                        .map(|m| count_params(m.as_str()))
                        .unwrap_or(0);

                    let declared_type = spec
                        .type_group
                        .and_then(|g| caps.get(g))
                        .map(|m| m.as_str().to_string())
                        .or_else(|| spec.declared_type.map(|t| t.to_string()))
                        .unwrap_or_else(|| "unknown".to_string());

                    raw.push(RawUnit {
                        target: if spec.kind == PatternKind::Import {
                            name.clone()
                        } else {
                            String::new()
                        },
                        name,
                        kind: spec.kind,
                        line: idx + 1,
                        indent,
                        parameter_count,
                        declared_type,
                    });
                }
            }
        }

        let last_line = if capped { scanned } else { file.line_count() };
        let units = assemble(raw, &file.path, last_line);

        Ok(Extraction {
            units,
            partial: capped,
        })
    }
}

/// Count parameters in a raw parameter-list string.
fn count_params(params: &str) -> usize {
    params.split(',').filter(|p| !p.trim().is_empty()).count()
}

/// Infer extents from indentation and nest units by containment.
///
/// A container (class or function) runs until the next declaration at the
/// same or shallower indent. Pattern matching has no brace tracking, so the
/// extent occasionally swallows trailing top-level lines; this is part of
/// the documented heuristic trade-off.
fn assemble(raw: Vec<RawUnit>, file: &str, last_line: usize) -> Vec<StructuralUnit> {
    let mut ends: Vec<usize> = Vec::with_capacity(raw.len());
    for (i, unit) in raw.iter().enumerate() {
        let end = match unit.kind {
            PatternKind::Class | PatternKind::Function => raw[i + 1..]
                .iter()
                .find(|next| next.indent <= unit.indent)
                .map(|next| next.line.saturating_sub(1))
                .unwrap_or(last_line)
                .max(unit.line),
            _ => unit.line,
        };
        ends.push(end);
    }

    // Nest each unit under the innermost earlier container enclosing it.
    let mut units: Vec<Option<StructuralUnit>> = Vec::with_capacity(raw.len());
    let mut parents: Vec<Option<usize>> = vec![None; raw.len()];

    for (i, unit) in raw.iter().enumerate() {
        let mut parent: Option<usize> = None;
        for j in (0..i).rev() {
            let container = matches!(raw[j].kind, PatternKind::Class | PatternKind::Function);
            if container && raw[j].line < unit.line && ends[j] >= ends[i] && raw[j].indent < unit.indent
            {
                parent = Some(j);
                break;
            }
        }
        parents[i] = parent;

        let scope = match parent {
            None => Scope::Global,
            Some(j) => match raw[j].kind {
                PatternKind::Class => Scope::Class,
                _ => Scope::Function,
            },
        };

        let kind = match unit.kind {
            PatternKind::Class => UnitKind::Class { children: vec![] },
            PatternKind::Function => UnitKind::Function {
                parameter_count: unit.parameter_count,
                body: Some(Span::new(unit.line, ends[i])),
                branches: None,
                complexity: 0,
                children: vec![],
            },
            PatternKind::Variable => UnitKind::Variable {
                declared_type: unit.declared_type.clone(),
            },
            PatternKind::Import => UnitKind::Import {
                target: unit.target.clone(),
            },
        };

        units.push(Some(StructuralUnit {
            name: unit.name.clone(),
            file: file.to_string(),
            span: Span::new(unit.line, ends[i]),
            scope,
            kind,
        }));
    }

    // Attach children to parents, deepest-first so grandchildren are in
    // place before their parent is moved.
    for i in (0..units.len()).rev() {
        if let Some(j) = parents[i] {
            let child = units[i].take().expect("child already moved");
            if let Some(parent) = units[j].as_mut() {
                match &mut parent.kind {
                    UnitKind::Class { children } => children.push(child),
                    UnitKind::Function { children, .. } => children.push(child),
                    _ => units[i] = Some(child),
                }
            }
        }
    }

    let mut out: Vec<StructuralUnit> = units.into_iter().flatten().collect();
    // Children were attached in reverse; restore source order.
    for unit in &mut out {
        unit.walk_mut(&mut |u| match &mut u.kind {
            UnitKind::Class { children } => children.sort_by_key(|c| c.span.start_line),
            UnitKind::Function { children, .. } => children.sort_by_key(|c| c.span.start_line),
            _ => {}
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::languages::javascript::JAVASCRIPT_TABLE;
    use crate::model::flatten;

    fn extract(content: &str) -> Extraction {
        let extractor = HeuristicExtractor::new(&JAVASCRIPT_TABLE, 400);
        let file = SourceFile::new("app.js", Language::JavaScript, content);
        extractor.extract(&file).unwrap()
    }

    #[test]
    fn test_no_double_count_across_patterns() {
        // An arrow-function binding matches both the function pattern and
        // the generic variable pattern; it must surface once, as a function.
        let result = extract("const add = (a, b) => a + b;\n");
        assert_eq!(result.units.len(), 1);
        assert_eq!(result.units[0].name, "add");
        assert!(result.units[0].is_function());
    }

    #[test]
    fn test_partial_flag_on_cap() {
        let extractor = HeuristicExtractor::new(&JAVASCRIPT_TABLE, 10);
        let content = "let x = 1;\n".repeat(20);
        let file = SourceFile::new("big.js", Language::JavaScript, content);
        let result = extractor.extract(&file).unwrap();
        assert!(result.partial);
    }

    #[test]
    fn test_methods_nest_under_class() {
        let content = r#"
class Store {
  constructor(backend) {
    this.backend = backend;
  }

  load(key) {
    return this.backend.get(key);
  }
}

function standalone() {}
"#;
        let result = extract(content);
        let class = result
            .units
            .iter()
            .find(|u| u.name == "Store")
            .expect("class unit");
        let child_names: Vec<&str> = class.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(child_names, vec!["constructor", "load"]);
        assert!(class
            .children()
            .iter()
            .all(|c| matches!(c.scope, Scope::Class)));

        let standalone = result
            .units
            .iter()
            .find(|u| u.name == "standalone")
            .expect("standalone fn");
        assert_eq!(standalone.scope, Scope::Global);
    }

    #[test]
    fn test_keyword_guard_on_method_fallback() {
        let result = extract("  if (ready) {\n    run();\n  }\n");
        assert!(flatten(&result.units).iter().all(|u| u.name != "if"));
    }

    #[test]
    fn test_parameter_counts() {
        let result = extract("function three(a, b, c) {}\nfunction none() {}\n");
        let three = result.units.iter().find(|u| u.name == "three").unwrap();
        let none = result.units.iter().find(|u| u.name == "none").unwrap();
        match (&three.kind, &none.kind) {
            (
                UnitKind::Function {
                    parameter_count: p3,
                    ..
                },
                UnitKind::Function {
                    parameter_count: p0,
                    ..
                },
            ) => {
                assert_eq!(*p3, 3);
                assert_eq!(*p0, 0);
            }
            _ => panic!("expected functions"),
        }
    }
}
