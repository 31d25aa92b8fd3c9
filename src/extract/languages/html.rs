//! HTML pattern table.
//!
//! Markup has no functions or classes to extract; what matters for the
//! usage graph is the anchor vocabulary (element ids, CSS class attributes)
//! and the external resources a page pulls in.

use once_cell::sync::OnceCell;

use super::super::heuristic::{PatternKind, PatternSpec, PatternTable};
use crate::inventory::Language;

const COMMENT_PREFIXES: &[&str] = &["<!--"];

const HTML_PATTERNS: &[PatternSpec] = &[
    PatternSpec::simple(
        PatternKind::Import,
        r#"<script[^>]*\ssrc=["']([^"']+)["']"#,
        1,
    ),
    PatternSpec::simple(
        PatternKind::Import,
        r#"<link[^>]*\shref=["']([^"']+)["']"#,
        1,
    ),
    PatternSpec {
        kind: PatternKind::Variable,
        pattern: r#"\sid=["']([^"']+)["']"#,
        name_group: 1,
        params_group: None,
        declared_type: Some("html-id"),
        type_group: None,
        filter_keywords: false,
    },
    PatternSpec {
        kind: PatternKind::Variable,
        pattern: r#"\sclass=["']([^"']+)["']"#,
        name_group: 1,
        params_group: None,
        declared_type: Some("html-class"),
        type_group: None,
        filter_keywords: false,
    },
];

pub static HTML_TABLE: PatternTable = PatternTable {
    language: Language::Html,
    patterns: HTML_PATTERNS,
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
    fn test_ids_and_script_sources() {
        let extractor = HeuristicExtractor::new(&HTML_TABLE, 400);
        let file = SourceFile::new(
            "index.html",
            Language::Html,
            r#"
<html>
  <head><script src="app.js"></script></head>
  <body>
    <div id="sidebar" class="panel dark"></div>
  </body>
</html>
"#,
        );
        let result = extractor.extract(&file).unwrap();

        assert!(result.units.iter().any(
            |u| matches!(&u.kind, UnitKind::Import { target } if target == "app.js")
        ));
        assert!(result.units.iter().any(|u| u.name == "sidebar"));
        assert!(result.units.iter().any(
            |u| matches!(&u.kind, UnitKind::Variable { declared_type } if declared_type == "html-class")
        ));
    }
}
