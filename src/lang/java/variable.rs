// SPDX-License-Identifier: Apache-2.0

//! Formal parameters and local variables.

use crate::query::run_query_at;
use crate::source::SourceFile;
use tree_sitter::Node;

use super::method;

/// Name and declared type of a parameter or local variable.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VariableDescriptor {
    pub name: String,
    pub type_name: String,
}

pub fn parameter_name(file: &SourceFile, parameter: Node<'_>) -> Option<String> {
    match parameter.kind() {
        "formal_parameter" => parameter
            .child_by_field_name("name")
            .map(|name| file.node_text(name).to_string()),
        // Spread parameters keep their name in a declarator child.
        "spread_parameter" => {
            let mut cursor = parameter.walk();
            parameter
                .named_children(&mut cursor)
                .find(|child| child.kind() == "variable_declarator")
                .and_then(|declarator| declarator.child_by_field_name("name"))
                .map(|name| file.node_text(name).to_string())
        }
        _ => None,
    }
}

pub fn parameter_type(file: &SourceFile, parameter: Node<'_>) -> Option<String> {
    if let Some(ty) = parameter.child_by_field_name("type") {
        return Some(file.node_text(ty).to_string());
    }
    // A spread parameter has no type field; the type is its first named
    // child before the declarator.
    let mut cursor = parameter.walk();
    parameter
        .named_children(&mut cursor)
        .find(|child| !matches!(child.kind(), "variable_declarator" | "modifiers"))
        .map(|ty| file.node_text(ty).to_string())
}

pub fn find_parameter<'a>(
    file: &SourceFile,
    method: Node<'a>,
    name: &str,
) -> Option<Node<'a>> {
    method::parameters(method)
        .into_iter()
        .find(|parameter| parameter_name(file, *parameter).as_deref() == Some(name))
}

/// Local variable declarations anywhere inside a method body.
pub fn locals_of<'a>(file: &'a SourceFile, method: Node<'a>) -> Vec<Node<'a>> {
    let Some(body) = method.child_by_field_name("body") else {
        return Vec::new();
    };
    run_query_at(file, body, "(local_variable_declaration) @declaration").nodes()
}

pub fn local_name(file: &SourceFile, declaration: Node<'_>) -> Option<String> {
    declaration
        .child_by_field_name("declarator")
        .and_then(|declarator| declarator.child_by_field_name("name"))
        .map(|name| file.node_text(name).to_string())
}

pub fn local_type(file: &SourceFile, declaration: Node<'_>) -> Option<String> {
    declaration
        .child_by_field_name("type")
        .map(|ty| file.node_text(ty).to_string())
}

pub fn find_local<'a>(file: &'a SourceFile, method: Node<'a>, name: &str) -> Option<Node<'a>> {
    locals_of(file, method)
        .into_iter()
        .find(|declaration| local_name(file, *declaration).as_deref() == Some(name))
}

pub fn descriptor(file: &SourceFile, node: Node<'_>) -> VariableDescriptor {
    match node.kind() {
        "local_variable_declaration" => VariableDescriptor {
            name: local_name(file, node).unwrap_or_default(),
            type_name: local_type(file, node).unwrap_or_default(),
        },
        _ => VariableDescriptor {
            name: parameter_name(file, node).unwrap_or_default(),
            type_name: parameter_type(file, node).unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::SupportedLanguage;
    use crate::lang::java::class;

    const SOURCE: &str = "\
class A {
    void f(String first, int... rest) {
        long total = 0;
        if (first != null) {
            String inner = first;
        }
    }
}
";

    fn parse(source: &str) -> SourceFile {
        SourceFile::from_source(SupportedLanguage::Java, source).unwrap()
    }

    #[test]
    fn reads_parameters_including_varargs() {
        let file = parse(SOURCE);
        let class = class::find_by_name(&file, "A").unwrap();
        let method = method::find(&file, class, "f").unwrap();

        let first = find_parameter(&file, method, "first").unwrap();
        assert_eq!(
            descriptor(&file, first),
            VariableDescriptor {
                name: "first".into(),
                type_name: "String".into()
            }
        );

        let rest = find_parameter(&file, method, "rest").unwrap();
        assert_eq!(rest.kind(), "spread_parameter");
        assert_eq!(parameter_type(&file, rest).as_deref(), Some("int"));
    }

    #[test]
    fn finds_locals_in_nested_blocks() {
        let file = parse(SOURCE);
        let class = class::find_by_name(&file, "A").unwrap();
        let method = method::find(&file, class, "f").unwrap();

        let names: Vec<String> = locals_of(&file, method)
            .into_iter()
            .filter_map(|declaration| local_name(&file, declaration))
            .collect();
        assert_eq!(names, vec!["total", "inner"]);

        let total = find_local(&file, method, "total").unwrap();
        assert_eq!(local_type(&file, total).as_deref(), Some("long"));
        assert!(find_local(&file, method, "missing").is_none());
    }
}
