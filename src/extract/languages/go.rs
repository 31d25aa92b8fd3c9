//! Go grammar configuration.
//!
//! Go has no class nesting; struct and interface types surface as Class
//! units and methods stay top-level functions (receiver binding is a
//! name-matching concern, not a structural one).

use super::super::treesitter::GrammarConfig;
use crate::inventory::Language;

const DECL_QUERY: &str = r#"
(function_declaration name: (identifier) @func_name) @function
(method_declaration name: (field_identifier) @func_name) @function
(type_declaration (type_spec name: (type_identifier) @class_name type: (struct_type))) @class
(type_declaration (type_spec name: (type_identifier) @class_name type: (interface_type))) @class
(source_file (var_declaration (var_spec name: (identifier) @var_name type: (_)? @var_type)) @variable)
(source_file (const_declaration (const_spec name: (identifier) @var_name type: (_)? @var_type)) @variable)
"#;

const IMPORT_QUERY: &str = r#"
(import_declaration (import_spec path: (interpreted_string_literal) @import_path) @import)
(import_declaration (import_spec_list (import_spec path: (interpreted_string_literal) @import_path) @import))
"#;

const BRANCH_QUERY: &str = r#"
(if_statement) @branch
(for_statement) @branch
(expression_case) @branch
(type_case) @branch
(communication_case) @branch
(binary_expression operator: "&&") @branch
(binary_expression operator: "||") @branch
"#;

pub fn grammar() -> GrammarConfig {
    GrammarConfig {
        grammar: tree_sitter_go::LANGUAGE.into(),
        language: Language::Go,
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
    fn test_go_symbols() {
        let extractor = languages::extractor_for(Language::Go, &EngineConfig::default()).unwrap();
        let file = SourceFile::new(
            "main.go",
            Language::Go,
            r#"
package main

import "fmt"

const Version = "1.0"

type Config struct {
	Name string
}

func (c *Config) Validate() bool {
	if c.Name == "" {
		return false
	}
	return true
}

func main() {
	fmt.Println(Version)
}
"#,
        );

        let result = extractor.extract(&file).unwrap();
        assert!(result
            .units
            .iter()
            .any(|u| u.name == "Config" && matches!(u.kind, UnitKind::Class { .. })));
        assert!(result
            .units
            .iter()
            .any(|u| u.name == "Version" && matches!(u.kind, UnitKind::Variable { .. })));
        assert!(result.units.iter().any(|u| u.name == "main" && u.is_function()));

        let validate = result.units.iter().find(|u| u.name == "Validate").unwrap();
        match &validate.kind {
            UnitKind::Function { branches, .. } => assert_eq!(*branches, Some(1)),
            _ => panic!("expected function"),
        }

        assert!(result
            .units
            .iter()
            .any(|u| matches!(&u.kind, UnitKind::Import { target } if target == "fmt")));
    }
}
