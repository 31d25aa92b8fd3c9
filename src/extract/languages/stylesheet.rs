//! CSS and SCSS pattern tables.
//!
//! Stylesheet "variables" are custom properties (`--name`) and SCSS
//! variables (`$name`); they are modeled as global Variable units and flow
//! through the same reachability pass as code symbols. Mixins and SCSS
//! functions surface as Function units.

use once_cell::sync::OnceCell;

use super::super::heuristic::{PatternKind, PatternSpec, PatternTable};
use crate::inventory::Language;

const COMMENT_PREFIXES: &[&str] = &["/*", "*", "//"];

const CSS_PATTERNS: &[PatternSpec] = &[
    PatternSpec {
        kind: PatternKind::Variable,
        pattern: r"(--[A-Za-z_][\w-]*)\s*:",
        name_group: 1,
        params_group: None,
        declared_type: Some("custom-property"),
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec::simple(
        PatternKind::Import,
        r#"@import\s+(?:url\()?['"]?([^'")\s;]+)"#,
        1,
    ),
];

const SCSS_PATTERNS: &[PatternSpec] = &[
    // @use/@forward/@import before the generic variable forms.
    PatternSpec::simple(
        PatternKind::Import,
        r#"@(?:use|forward|import)\s+['"]([^'"]+)['"]"#,
        1,
    ),
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"@function\s+([A-Za-z_][\w-]*)\s*\(([^)]*)\)?",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Function,
        pattern: r"@mixin\s+([A-Za-z_][\w-]*)(?:\s*\(([^)]*)\))?",
        name_group: 1,
        params_group: Some(2),
        declared_type: None,
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Variable,
        pattern: r"^\s*(\$[A-Za-z_][\w-]*)\s*:",
        name_group: 1,
        params_group: None,
        declared_type: Some("scss-variable"),
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Variable,
        pattern: r"(--[A-Za-z_][\w-]*)\s*:",
        name_group: 1,
        params_group: None,
        declared_type: Some("custom-property"),
        type_group: None,
        filter_keywords: false,
    },
];

pub static CSS_TABLE: PatternTable = PatternTable {
    language: Language::Css,
    patterns: CSS_PATTERNS,
    comment_prefixes: COMMENT_PREFIXES,
    compiled: OnceCell::new(),
};

pub static SCSS_TABLE: PatternTable = PatternTable {
    language: Language::Scss,
    patterns: SCSS_PATTERNS,
    comment_prefixes: COMMENT_PREFIXES,
    compiled: OnceCell::new(),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::heuristic::HeuristicExtractor;
    use crate::extract::Extractor;
    use crate::inventory::SourceFile;
    use crate::model::{Scope, UnitKind};

    #[test]
    fn test_css_custom_properties_are_global_variables() {
        let extractor = HeuristicExtractor::new(&CSS_TABLE, 400);
        let file = SourceFile::new(
            "theme.css",
            Language::Css,
            ":root {\n  --main-color: #663399;\n  --spacing: 8px;\n}\n.button { color: var(--main-color); }\n",
        );
        let result = extractor.extract(&file).unwrap();

        let names: Vec<&str> = result.units.iter().map(|u| u.name.as_str()).collect();
        assert!(names.contains(&"--main-color"));
        assert!(names.contains(&"--spacing"));
        assert!(result.units.iter().all(|u| u.scope == Scope::Global));
    }

    #[test]
    fn test_scss_variables_and_mixins() {
        let extractor = HeuristicExtractor::new(&SCSS_TABLE, 400);
        let file = SourceFile::new(
            "base.scss",
            Language::Scss,
            r#"
@use 'sass:math';
$gutter: 16px;

@mixin centered($axis) {
  display: flex;
}
"#,
        );
        let result = extractor.extract(&file).unwrap();

        assert!(result
            .units
            .iter()
            .any(|u| u.name == "$gutter" && matches!(u.kind, UnitKind::Variable { .. })));
        assert!(result
            .units
            .iter()
            .any(|u| u.name == "centered" && u.is_function()));
        assert!(result.units.iter().any(
            |u| matches!(&u.kind, UnitKind::Import { target } if target == "sass:math")
        ));
    }
}
