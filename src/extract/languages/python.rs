//! Python grammar configuration.

use super::super::treesitter::GrammarConfig;
use crate::inventory::Language;

/// Declarations: classes, functions (methods fall out of nesting),
/// module-level assignments, and class-level field assignments.
const DECL_QUERY: &str = r#"
(class_definition name: (identifier) @class_name) @class
(function_definition name: (identifier) @func_name) @function
(module (expression_statement (assignment left: (identifier) @var_name)) @variable)
(class_definition body: (block (expression_statement (assignment left: (identifier) @var_name)) @variable))
"#;

const IMPORT_QUERY: &str = r#"
(import_statement name: (dotted_name) @import_path) @import
(import_statement name: (aliased_import name: (dotted_name) @import_path)) @import
(import_from_statement module_name: (dotted_name) @import_path) @import
"#;

/// Branch constructs: conditionals, loops, exception handlers, boolean
/// operators, ternaries, and match-case arms.
const BRANCH_QUERY: &str = r#"
(if_statement) @branch
(elif_clause) @branch
(for_statement) @branch
(while_statement) @branch
(except_clause) @branch
(conditional_expression) @branch
(boolean_operator operator: "and") @branch
(boolean_operator operator: "or") @branch
(case_clause) @branch
"#;

pub fn grammar() -> GrammarConfig {
    GrammarConfig {
        grammar: tree_sitter_python::LANGUAGE.into(),
        language: Language::Python,
        decl_query: DECL_QUERY,
        import_query: IMPORT_QUERY,
        branch_query: BRANCH_QUERY,
        params_field: "parameters",
        body_field: "body",
    }
}
