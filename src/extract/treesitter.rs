//! Grammar-driven precise extraction.
//!
//! One generic engine configured per language with tree-sitter queries.
//! Query capture names follow a fixed convention so the engine never needs
//! language-specific code:
//!
//! - `@class_name` / `@class`: type declarations and their nodes
//! - `@func_name` / `@function`: functions and methods
//! - `@var_name` / `@variable` (+ optional `@var_type`): variable forms
//! - `@import_path` / `@import`: import statements
//!
//! Branch constructs are tallied per function by running the branch query
//! over the function node; the tally covers the same construct set as the
//! token scorer so both extraction modes agree.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language as TsLanguage, Node, Parser, Query, QueryCursor};

use super::{Extraction, Extractor};
use crate::error::ExtractError;
use crate::inventory::{Language, SourceFile};
use crate::model::{Scope, Span, StructuralUnit, UnitKind};

/// Per-language configuration for the precise extractor.
#[derive(Clone)]
pub struct GrammarConfig {
    pub grammar: TsLanguage,
    pub language: Language,
    pub decl_query: &'static str,
    pub import_query: &'static str,
    pub branch_query: &'static str,
    /// Field name of a function's parameter list node.
    pub params_field: &'static str,
    /// Field name of a function's body node.
    pub body_field: &'static str,
}

/// Precise extractor backed by a tree-sitter grammar.
pub struct PreciseExtractor {
    config: GrammarConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Class,
    Function,
    Variable,
}

struct FlatDecl {
    name: String,
    kind: DeclKind,
    start_byte: usize,
    end_byte: usize,
    span: Span,
    parameter_count: usize,
    body: Option<Span>,
    branches: u32,
    declared_type: String,
}

impl PreciseExtractor {
    pub fn new(config: GrammarConfig) -> Self {
        Self { config }
    }

    fn parse(&self, source: &[u8]) -> anyhow::Result<tree_sitter::Tree> {
        let mut parser = Parser::new();
        parser.set_language(&self.config.grammar)?;
        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse source"))
    }

    fn extract_declarations(
        &self,
        root: Node,
        source: &[u8],
    ) -> anyhow::Result<Vec<FlatDecl>> {
        let query = Query::new(&self.config.grammar, self.config.decl_query)?;
        let branch_query = Query::new(&self.config.grammar, self.config.branch_query)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source);

        let mut decls: Vec<FlatDecl> = Vec::new();
        let mut seen = std::collections::HashSet::new();

        while let Some(m) = matches.next() {
            let mut name = String::new();
            let mut kind = None;
            let mut decl_node = None;
            let mut declared_type = None;

            for capture in m.captures {
                let capture_name = query.capture_names()[capture.index as usize];
                match capture_name {
                    "class_name" => {
                        name = node_text(capture.node, source);
                        kind = Some(DeclKind::Class);
                    }
                    "func_name" => {
                        name = node_text(capture.node, source);
                        kind = Some(DeclKind::Function);
                    }
                    "var_name" => {
                        name = node_text(capture.node, source);
                        kind = Some(DeclKind::Variable);
                    }
                    "var_type" => {
                        declared_type = Some(node_text(capture.node, source));
                    }
                    "class" | "function" | "variable" => {
                        decl_node = Some(capture.node);
                    }
                    _ => {}
                }
            }

            let (kind, node) = match (kind, decl_node) {
                (Some(k), Some(n)) => (k, n),
                _ => continue,
            };
            if name.is_empty() || !seen.insert((node.start_byte(), name.clone())) {
                continue;
            }

            let (parameter_count, body, branches) = if kind == DeclKind::Function {
                let params = node
                    .child_by_field_name(self.config.params_field)
                    .map(|p| p.named_child_count())
                    .unwrap_or(0);
                let body = node
                    .child_by_field_name(self.config.body_field)
                    .map(span_of);
                let branches = count_matches(&branch_query, node, source);
                (params, body, branches)
            } else {
                (0, None, 0)
            };

            decls.push(FlatDecl {
                name,
                kind,
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                span: span_of(node),
                parameter_count,
                body,
                branches,
                declared_type: declared_type.unwrap_or_else(|| "unknown".to_string()),
            });
        }

        decls.sort_by_key(|d| (d.start_byte, std::cmp::Reverse(d.end_byte)));
        Ok(decls)
    }

    fn extract_imports(
        &self,
        root: Node,
        source: &[u8],
        file: &str,
    ) -> anyhow::Result<Vec<StructuralUnit>> {
        if self.config.import_query.is_empty() {
            return Ok(vec![]);
        }

        let query = Query::new(&self.config.grammar, self.config.import_query)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source);

        let mut imports = Vec::new();
        let mut seen = std::collections::HashSet::new();

        while let Some(m) = matches.next() {
            let mut target = String::new();
            let mut line = 0usize;

            for capture in m.captures {
                let capture_name = query.capture_names()[capture.index as usize];
                if capture_name == "import_path" {
                    target = node_text(capture.node, source)
                        .trim_matches(|c| c == '"' || c == '\'')
                        .to_string();
                    line = capture.node.start_position().row + 1;
                }
            }

            if !target.is_empty() && seen.insert((target.clone(), line)) {
                imports.push(StructuralUnit {
                    name: target.clone(),
                    file: file.to_string(),
                    span: Span::line(line),
                    scope: Scope::Global,
                    kind: UnitKind::Import { target },
                });
            }
        }

        Ok(imports)
    }
}

impl Extractor for PreciseExtractor {
    fn language(&self) -> Language {
        self.config.language
    }

    fn extract(&self, file: &SourceFile) -> Result<Extraction, ExtractError> {
        let source = file.content.as_bytes();

        let tree = self.parse(source).map_err(|e| ExtractError::Malformed {
            file: file.path.clone(),
            message: e.to_string(),
        })?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return Err(ExtractError::Malformed {
                file: file.path.clone(),
                message: format!("syntax error near line {}", line),
            });
        }

        let decls = self
            .extract_declarations(root, source)
            .map_err(|e| ExtractError::Malformed {
                file: file.path.clone(),
                message: e.to_string(),
            })?;

        let mut units = nest(decls, &file.path);
        let imports = self
            .extract_imports(root, source, &file.path)
            .map_err(|e| ExtractError::Malformed {
                file: file.path.clone(),
                message: e.to_string(),
            })?;
        units.extend(imports);
        units.sort_by_key(|u| u.span.start_line);

        Ok(Extraction {
            units,
            partial: false,
        })
    }
}

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

fn span_of(node: Node) -> Span {
    Span::new(node.start_position().row + 1, node.end_position().row + 1)
}

fn count_matches(query: &Query, node: Node, source: &[u8]) -> u32 {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, node, source);
    let mut count = 0;
    while matches.next().is_some() {
        count += 1;
    }
    count
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(line) = first_error_line(child) {
                return Some(line);
            }
        }
    }
    None
}

/// Turn a byte-sorted flat declaration list into a nested unit forest.
///
/// A declaration becomes a child of the innermost earlier declaration whose
/// byte span contains it; scope follows the parent's kind. Nested functions
/// stay distinct units under their enclosing unit, never flattened.
fn nest(decls: Vec<FlatDecl>, file: &str) -> Vec<StructuralUnit> {
    let mut parents: Vec<Option<usize>> = vec![None; decls.len()];
    let mut stack: Vec<usize> = Vec::new();

    for i in 0..decls.len() {
        while let Some(&top) = stack.last() {
            if decls[top].end_byte >= decls[i].end_byte && decls[top].start_byte < decls[i].start_byte
            {
                break;
            }
            stack.pop();
        }
        parents[i] = stack.last().copied();
        if matches!(decls[i].kind, DeclKind::Class | DeclKind::Function) {
            stack.push(i);
        }
    }

    let mut units: Vec<Option<StructuralUnit>> = decls
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let scope = match parents[i] {
                None => Scope::Global,
                Some(j) => match decls[j].kind {
                    DeclKind::Class => Scope::Class,
                    _ => Scope::Function,
                },
            };
            let kind = match d.kind {
                DeclKind::Class => UnitKind::Class { children: vec![] },
                DeclKind::Function => UnitKind::Function {
                    parameter_count: d.parameter_count,
                    body: d.body,
                    branches: Some(d.branches),
                    complexity: 0,
                    children: vec![],
                },
                DeclKind::Variable => UnitKind::Variable {
                    declared_type: d.declared_type.clone(),
                },
            };
            Some(StructuralUnit {
                name: d.name.clone(),
                file: file.to_string(),
                span: d.span,
                scope,
                kind,
            })
        })
        .collect();

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
    use crate::extract::languages;
    use crate::config::EngineConfig;
    use crate::model::flatten;

    fn extract_python(content: &str) -> Extraction {
        let extractor =
            languages::extractor_for(Language::Python, &EngineConfig::default()).unwrap();
        let file = SourceFile::new("mod.py", Language::Python, content);
        extractor.extract(&file).unwrap()
    }

    #[test]
    fn test_python_class_with_methods() {
        let result = extract_python(
            r#"
class Store:
    limit = 10

    def load(self, key):
        return self.data[key]

def standalone():
    pass
"#,
        );

        let store = result.units.iter().find(|u| u.name == "Store").unwrap();
        assert!(matches!(store.kind, UnitKind::Class { .. }));

        let child_names: Vec<&str> = store.children().iter().map(|c| c.name.as_str()).collect();
        assert!(child_names.contains(&"load"));
        assert!(child_names.contains(&"limit"));
        assert!(store.children().iter().all(|c| c.scope == Scope::Class));

        let standalone = result.units.iter().find(|u| u.name == "standalone").unwrap();
        assert_eq!(standalone.scope, Scope::Global);
    }

    #[test]
    fn test_python_nested_function_not_flattened() {
        let result = extract_python(
            r#"
def outer():
    def inner():
        pass
    return inner
"#,
        );

        let outer = result.units.iter().find(|u| u.name == "outer").unwrap();
        let inner = outer
            .children()
            .iter()
            .find(|c| c.name == "inner")
            .expect("inner nested under outer");
        assert_eq!(inner.scope, Scope::Function);

        // Flattening still sees both.
        assert_eq!(
            flatten(&result.units)
                .iter()
                .filter(|u| u.is_function())
                .count(),
            2
        );
    }

    #[test]
    fn test_python_branch_tally() {
        let result = extract_python(
            r#"
def branchy(x):
    if x > 0:
        for i in range(x):
            while i:
                i -= 1
    elif x < 0:
        return -1
    return 0
"#,
        );

        let branchy = result.units.iter().find(|u| u.name == "branchy").unwrap();
        match &branchy.kind {
            UnitKind::Function { branches, .. } => {
                // if + for + while + elif
                assert_eq!(*branches, Some(4));
            }
            _ => panic!("expected function"),
        }
    }

    #[test]
    fn test_python_syntax_error_is_malformed() {
        let extractor =
            languages::extractor_for(Language::Python, &EngineConfig::default()).unwrap();
        let file = SourceFile::new("bad.py", Language::Python, "def broken(:\n    pass\n");
        let err = extractor.extract(&file).unwrap_err();
        let ExtractError::Malformed { file, message } = err;
        assert_eq!(file, "bad.py");
        assert!(message.contains("syntax error"), "got: {}", message);
    }

    #[test]
    fn test_python_imports() {
        let result = extract_python("import os\nfrom collections import defaultdict\n");
        let targets: Vec<&str> = result
            .units
            .iter()
            .filter_map(|u| match &u.kind {
                UnitKind::Import { target } => Some(target.as_str()),
                _ => None,
            })
            .collect();
        assert!(targets.contains(&"os"));
        assert!(targets.contains(&"collections"));
    }
}
