//! JavaScript and TypeScript pattern tables.
//!
//! Ordered specific-to-generic: import forms, class declarations, the
//! function forms (declaration, arrow binding, object property, method
//! shorthand), then the generic variable fallback. The arrow-binding form
//! must precede the variable fallback or `const f = () => ...` would be
//! counted as a variable.

use once_cell::sync::OnceCell;

use super::super::heuristic::{PatternKind, PatternSpec, PatternTable};
use crate::inventory::Language;

const COMMENT_PREFIXES: &[&str] = &["//", "/*", "*"];

const JS_PATTERNS: &[PatternSpec] = &[
    // import x from 'pkg'; import 'pkg';
    PatternSpec::simple(
        PatternKind::Import,
        r#"^\s*import\s+.*?from\s+['"]([^'"]+)['"]"#,
        1,
    ),
    PatternSpec::simple(PatternKind::Import, r#"^\s*import\s+['"]([^'"]+)['"]"#, 1),
    PatternSpec::simple(
        PatternKind::Import,
        r#"require\(\s*['"]([^'"]+)['"]\s*\)"#,
        1,
    ),
    PatternSpec::simple(
        PatternKind::Class,
        r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)",
        1,
    ),
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(([^)]*)\)",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?\(([^)]*)\)\s*(?::\s*[\w<>,\s|\[\]]+)?\s*=>",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?([A-Za-z_$][\w$]*)\s*=>",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"^\s*([A-Za-z_$][\w$]*)\s*:\s*(?:async\s+)?function\s*\(([^)]*)\)",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: false,
    },
    // Method shorthand: name(args) { - generic, so keyword-guarded.
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"^\s*(?:static\s+)?(?:async\s+)?([A-Za-z_$][\w$]*)\s*\(([^)]*)\)\s*\{",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: true,
    },
    PatternSpec {
        kind: PatternKind::Variable,
        pattern: r"^\s*(?:export\s+)?(const|let|var)\s+([A-Za-z_$][\w$]*)",
        name_group: 2,
        params_group: None,
        declared_type: None,
        type_group: Some(1),
        filter_keywords: false,
    },
];

/// TypeScript adds interface/type/enum declarations on top of the
/// JavaScript forms.
const TS_PATTERNS: &[PatternSpec] = &[
    PatternSpec::simple(
        PatternKind::Import,
        r#"^\s*import\s+.*?from\s+['"]([^'"]+)['"]"#,
        1,
    ),
    PatternSpec::simple(PatternKind::Import, r#"^\s*import\s+['"]([^'"]+)['"]"#, 1),
    PatternSpec::simple(
        PatternKind::Import,
        r#"require\(\s*['"]([^'"]+)['"]\s*\)"#,
        1,
    ),
    PatternSpec::simple(
        PatternKind::Class,
        r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)",
        1,
    ),
    PatternSpec::simple(
        PatternKind::Class,
        r"^\s*(?:export\s+)?interface\s+([A-Za-z_$][\w$]*)",
        1,
    ),
    PatternSpec::simple(
        PatternKind::Class,
        r"^\s*(?:export\s+)?(?:type|enum)\s+([A-Za-z_$][\w$]*)",
        1,
    ),
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(([^)]*)\)",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?\(([^)]*)\)\s*(?::\s*[\w<>,\s|\[\]]+)?\s*=>",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?([A-Za-z_$][\w$]*)\s*=>",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"^\s*(?:static\s+)?(?:async\s+)?([A-Za-z_$][\w$]*)\s*\(([^)]*)\)\s*(?::\s*[\w<>,\s|\[\]]+)?\s*\{",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: true,
    },
    PatternSpec {
        kind: PatternKind::Variable,
        pattern: r"^\s*(?:export\s+)?(const|let|var)\s+([A-Za-z_$][\w$]*)",
        name_group: 2,
        params_group: None,
        declared_type: None,
        type_group: Some(1),
        filter_keywords: false,
    },
];

pub static JAVASCRIPT_TABLE: PatternTable = PatternTable {
    language: Language::JavaScript,
    patterns: JS_PATTERNS,
    comment_prefixes: COMMENT_PREFIXES,
    compiled: OnceCell::new(),
};

pub static TYPESCRIPT_TABLE: PatternTable = PatternTable {
    language: Language::TypeScript,
    patterns: TS_PATTERNS,
    comment_prefixes: COMMENT_PREFIXES,
    compiled: OnceCell::new(),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::heuristic::HeuristicExtractor;
    use crate::extract::Extractor;
    use crate::inventory::SourceFile;
    use crate::model::UnitKind;

    #[test]
    fn test_js_imports() {
        let extractor = HeuristicExtractor::new(&JAVASCRIPT_TABLE, 400);
        let file = SourceFile::new(
            "app.js",
            Language::JavaScript,
            r#"
import express from 'express';
import './styles.css';
const lodash = require('lodash');
"#,
        );
        let result = extractor.extract(&file).unwrap();
        let targets: Vec<&str> = result
            .units
            .iter()
            .filter_map(|u| match &u.kind {
                UnitKind::Import { target } => Some(target.as_str()),
                _ => None,
            })
            .collect();
        assert!(targets.contains(&"express"));
        assert!(targets.contains(&"./styles.css"));
        assert!(targets.contains(&"lodash"));
    }

    #[test]
    fn test_js_variable_kinds() {
        let extractor = HeuristicExtractor::new(&JAVASCRIPT_TABLE, 400);
        let file = SourceFile::new(
            "app.js",
            Language::JavaScript,
            "const width = 10;\nlet height = 20;\n",
        );
        let result = extractor.extract(&file).unwrap();
        let width = result.units.iter().find(|u| u.name == "width").unwrap();
        match &width.kind {
            UnitKind::Variable { declared_type } => assert_eq!(declared_type, "const"),
            other => panic!("expected variable, got {}", other.label()),
        }
    }

    #[test]
    fn test_ts_interface_as_class() {
        let extractor = HeuristicExtractor::new(&TYPESCRIPT_TABLE, 400);
        let file = SourceFile::new(
            "types.ts",
            Language::TypeScript,
            "export interface Config {\n  name: string;\n}\n",
        );
        let result = extractor.extract(&file).unwrap();
        let config = result.units.iter().find(|u| u.name == "Config").unwrap();
        assert!(matches!(config.kind, UnitKind::Class { .. }));
    }
}
