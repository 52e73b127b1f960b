// SPDX-License-Identifier: Apache-2.0

//! Identifier-role classification, decided by the parent node's kind.

use tree_sitter::Node;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IdentifierRole {
    ClassName,
    MethodName,
    FieldName,
    FormalParameterName,
    LocalVariableName,
}

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// Role of an identifier node, or `None` for identifiers the engine does
/// not classify (labels, expression names, and the like).
pub fn classify(node: Node<'_>) -> Option<IdentifierRole> {
    match node.kind() {
        // Type usages are their own node kind in the grammar.
        "type_identifier" => Some(IdentifierRole::ClassName),
        "identifier" => {
            let parent = node.parent()?;
            let is_name_of = |candidate: Node<'_>| {
                candidate
                    .child_by_field_name("name")
                    .is_some_and(|name| name.id() == node.id())
            };
            match parent.kind() {
                kind if TYPE_DECLARATIONS.contains(&kind) && is_name_of(parent) => {
                    Some(IdentifierRole::ClassName)
                }
                "method_declaration" if is_name_of(parent) => Some(IdentifierRole::MethodName),
                "formal_parameter" if is_name_of(parent) => {
                    Some(IdentifierRole::FormalParameterName)
                }
                "variable_declarator" if is_name_of(parent) => {
                    match parent.parent().map(|grandparent| grandparent.kind()) {
                        Some("field_declaration") => Some(IdentifierRole::FieldName),
                        Some("local_variable_declaration") => {
                            Some(IdentifierRole::LocalVariableName)
                        }
                        _ => None,
                    }
                }
                _ => None,
            }
        }
        _ => None,
    }
}
