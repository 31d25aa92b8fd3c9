//! Rust grammar configuration.

use super::super::treesitter::GrammarConfig;
use crate::inventory::Language;

const DECL_QUERY: &str = r#"
(function_item name: (identifier) @func_name) @function
(struct_item name: (type_identifier) @class_name) @class
(enum_item name: (type_identifier) @class_name) @class
(trait_item name: (type_identifier) @class_name) @class
(const_item name: (identifier) @var_name type: (_) @var_type) @variable
(static_item name: (identifier) @var_name type: (_) @var_type) @variable
"#;

const IMPORT_QUERY: &str = r#"
(use_declaration argument: (_) @import_path) @import
"#;

const BRANCH_QUERY: &str = r#"
(if_expression) @branch
(while_expression) @branch
(for_expression) @branch
(loop_expression) @branch
(match_arm) @branch
(binary_expression operator: "&&") @branch
(binary_expression operator: "||") @branch
"#;

pub fn grammar() -> GrammarConfig {
    GrammarConfig {
        grammar: tree_sitter_rust::LANGUAGE.into(),
        language: Language::Rust,
        decl_query: DECL_QUERY,
        import_query: IMPORT_QUERY,
        branch_query: BRANCH_QUERY,
        params_field: "parameters",
        body_field: "body",
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::extract::{languages, Extractor as _};
    use crate::inventory::{Language, SourceFile};
    use crate::model::UnitKind;

    #[test]
    fn test_rust_symbols() {
        let extractor =
            languages::extractor_for(Language::Rust, &EngineConfig::default()).unwrap();
        let file = SourceFile::new(
            "lib.rs",
            Language::Rust,
            r#"
use std::collections::HashMap;

const LIMIT: usize = 8;

struct Cache {
    entries: HashMap<String, String>,
}

fn lookup(cache: &Cache, key: &str) -> Option<String> {
    match cache.entries.get(key) {
        Some(v) => Some(v.clone()),
        None => None,
    }
}
"#,
        );

        let result = extractor.extract(&file).unwrap();
        assert!(result
            .units
            .iter()
            .any(|u| u.name == "Cache" && matches!(u.kind, UnitKind::Class { .. })));
        assert!(result
            .units
            .iter()
            .any(|u| u.name == "LIMIT" && matches!(u.kind, UnitKind::Variable { .. })));

        let lookup = result.units.iter().find(|u| u.name == "lookup").unwrap();
        match &lookup.kind {
            UnitKind::Function {
                branches,
                parameter_count,
                ..
            } => {
                // Two match arms.
                assert_eq!(*branches, Some(2));
                assert_eq!(*parameter_count, 2);
            }
            _ => panic!("expected function"),
        }
    }
}
