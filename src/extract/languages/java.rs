//! Java grammar configuration.

use super::super::treesitter::GrammarConfig;
use crate::inventory::Language;

const DECL_QUERY: &str = r#"
(class_declaration name: (identifier) @class_name) @class
(interface_declaration name: (identifier) @class_name) @class
(enum_declaration name: (identifier) @class_name) @class
(method_declaration name: (identifier) @func_name) @function
(constructor_declaration name: (identifier) @func_name) @function
(field_declaration type: (_) @var_type declarator: (variable_declarator name: (identifier) @var_name)) @variable
(local_variable_declaration type: (_) @var_type declarator: (variable_declarator name: (identifier) @var_name)) @variable
"#;

const IMPORT_QUERY: &str = r#"
(import_declaration (scoped_identifier) @import_path) @import
(import_declaration (identifier) @import_path) @import
"#;

const BRANCH_QUERY: &str = r#"
(if_statement) @branch
(for_statement) @branch
(enhanced_for_statement) @branch
(while_statement) @branch
(do_statement) @branch
(catch_clause) @branch
(ternary_expression) @branch
(binary_expression operator: "&&") @branch
(binary_expression operator: "||") @branch
(switch_label) @branch
"#;

pub fn grammar() -> GrammarConfig {
    GrammarConfig {
        grammar: tree_sitter_java::LANGUAGE.into(),
        language: Language::Java,
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
    use crate::model::{Scope, UnitKind};

    #[test]
    fn test_java_class_members() {
        let extractor =
            languages::extractor_for(Language::Java, &EngineConfig::default()).unwrap();
        let file = SourceFile::new(
            "Store.java",
            Language::Java,
            r#"
import java.util.Map;

public class Store {
    private int limit = 10;

    public Store(int limit) {
        this.limit = limit;
    }

    public int load(String key) {
        if (key == null) {
            return 0;
        }
        return limit;
    }
}
"#,
        );

        let result = extractor.extract(&file).unwrap();
        let store = result.units.iter().find(|u| u.name == "Store").unwrap();
        assert!(matches!(store.kind, UnitKind::Class { .. }));

        let members: Vec<&str> = store.children().iter().map(|c| c.name.as_str()).collect();
        assert!(members.contains(&"limit"));
        assert!(members.contains(&"Store"));
        assert!(members.contains(&"load"));
        assert!(store.children().iter().all(|c| c.scope == Scope::Class));

        let load = store.children().iter().find(|c| c.name == "load").unwrap();
        match &load.kind {
            UnitKind::Function {
                branches,
                parameter_count,
                ..
            } => {
                assert_eq!(*branches, Some(1));
                assert_eq!(*parameter_count, 1);
            }
            _ => panic!("expected function"),
        }

        assert!(result
            .units
            .iter()
            .any(|u| matches!(&u.kind, UnitKind::Import { target } if target == "java.util.Map")));
    }
}
