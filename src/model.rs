//! The normalized structural model shared by every extractor.
//!
//! Extractors of very different fidelity (grammar-driven and pattern-driven)
//! all emit the same `StructuralUnit` shape, so everything downstream - the
//! usage graph, the dependency graph, the sampler - is language-agnostic.

use serde::{Deserialize, Serialize};

use crate::inventory::SourceFile;

/// Inclusive 1-indexed line range of a unit within its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
}

impl Span {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// Single-line span.
    pub fn line(line: usize) -> Self {
        Self {
            start_line: line,
            end_line: line,
        }
    }

    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start_line <= other.start_line && self.end_line >= other.end_line
    }

    /// Slice the file content covered by this span.
    ///
    /// Bodies are carried as spans into the owning file rather than copied
    /// strings; this is where the text is materialized on demand.
    pub fn text<'a>(&self, file: &'a SourceFile) -> String {
        file.content
            .lines()
            .skip(self.start_line.saturating_sub(1))
            .take(self.end_line.saturating_sub(self.start_line) + 1)
            .collect::<Vec<&'a str>>()
            .join("\n")
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_line, self.end_line)
    }
}

/// Lexical scope a unit was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    Class,
    Function,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Class => write!(f, "class"),
            Scope::Function => write!(f, "function"),
        }
    }
}

/// Kind-specific payload of a structural unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UnitKind {
    /// A class/type declaration owning its member units.
    Class {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<StructuralUnit>,
    },
    Function {
        parameter_count: usize,
        /// Body extent, when the extractor could determine one.
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<Span>,
        /// Branch tally from precise extraction (None in heuristic mode).
        #[serde(skip_serializing_if = "Option::is_none")]
        branches: Option<u32>,
        /// Filled exactly once by the scoring pass; 0 means unscored.
        complexity: u32,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<StructuralUnit>,
    },
    Variable {
        declared_type: String,
    },
    Import {
        /// Raw reference string, unresolved at extraction time.
        target: String,
    },
}

impl UnitKind {
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Class { .. } => "class",
            UnitKind::Function { .. } => "function",
            UnitKind::Variable { .. } => "variable",
            UnitKind::Import { .. } => "import",
        }
    }
}

/// One declared code element, normalized across languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralUnit {
    pub name: String,
    pub file: String,
    pub span: Span,
    pub scope: Scope,
    #[serde(flatten)]
    pub kind: UnitKind,
}

impl StructuralUnit {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, UnitKind::Function { .. })
    }

    pub fn is_import(&self) -> bool {
        matches!(self.kind, UnitKind::Import { .. })
    }

    /// Child units (class members, nested functions), if any.
    pub fn children(&self) -> &[StructuralUnit] {
        match &self.kind {
            UnitKind::Class { children } => children,
            UnitKind::Function { children, .. } => children,
            _ => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<StructuralUnit>> {
        match &mut self.kind {
            UnitKind::Class { children } => Some(children),
            UnitKind::Function { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Depth-first walk over this unit and all descendants.
    pub fn walk<'a>(&'a self, out: &mut Vec<&'a StructuralUnit>) {
        out.push(self);
        for child in self.children() {
            child.walk(out);
        }
    }

    /// Apply `f` to this unit and all descendants, mutably.
    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut StructuralUnit)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.walk_mut(f);
            }
        }
    }
}

/// Flatten a unit forest into a preorder list of borrows.
pub fn flatten(units: &[StructuralUnit]) -> Vec<&StructuralUnit> {
    let mut out = Vec::new();
    for unit in units {
        unit.walk(&mut out);
    }
    out
}

/// A raw use-site observed while tokenizing a file.
///
/// Deliberately not resolved to a definition at creation time; the usage
/// graph does best-effort name matching later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReference {
    pub name: String,
    pub line: usize,
    /// Qualified name of the innermost enclosing function/class, or None
    /// when the use-site is at file top level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclosing: Option<String>,
}

/// Everything one worker produced for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file: SourceFile,
    pub units: Vec<StructuralUnit>,
    pub references: Vec<RawReference>,
    /// Heuristic extraction hit its line cap; results cover a prefix only.
    pub partial: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Language;

    fn unit(name: &str, span: Span, kind: UnitKind) -> StructuralUnit {
        StructuralUnit {
            name: name.to_string(),
            file: "a.py".to_string(),
            span,
            scope: Scope::Global,
            kind,
        }
    }

    #[test]
    fn test_span_text() {
        let file = SourceFile::new("a.py", Language::Python, "one\ntwo\nthree\nfour");
        assert_eq!(Span::new(2, 3).text(&file), "two\nthree");
        assert_eq!(Span::line(1).text(&file), "one");
    }

    #[test]
    fn test_walk_recurses_into_children() {
        let method = unit(
            "bar",
            Span::new(2, 3),
            UnitKind::Function {
                parameter_count: 0,
                body: None,
                branches: None,
                complexity: 0,
                children: vec![],
            },
        );
        let class = unit(
            "Foo",
            Span::new(1, 4),
            UnitKind::Class {
                children: vec![method],
            },
        );

        let binding = [class];
        let flat = flatten(&binding);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].name, "Foo");
        assert_eq!(flat[1].name, "bar");
    }

    #[test]
    fn test_span_containment() {
        let outer = Span::new(1, 10);
        let inner = Span::new(3, 5);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains_line(10));
        assert!(!outer.contains_line(11));
    }
}
