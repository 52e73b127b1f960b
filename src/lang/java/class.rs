// SPDX-License-Identifier: Apache-2.0

//! Class-like declarations: lookup, member access, field insertion, rename.

use crate::error::EngineError;
use crate::query::run_query;
use crate::source::SourceFile;
use tree_sitter::Node;

use super::annotation;

/// Kinds the engine treats as class-like.
pub const CLASS_LIKE: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

const DECLARATIONS_QUERY: &str = "[\
 (class_declaration)\
 (interface_declaration)\
 (enum_declaration)\
 (record_declaration)\
 (annotation_type_declaration)\
] @declaration";

/// Every class-like declaration in the file, nested ones included.
pub fn declarations(file: &SourceFile) -> Vec<Node<'_>> {
    run_query(file, DECLARATIONS_QUERY).nodes()
}

/// Declarations directly under the compilation unit.
pub fn top_level(file: &SourceFile) -> Vec<Node<'_>> {
    declarations(file)
        .into_iter()
        .filter(|declaration| {
            declaration
                .parent()
                .is_some_and(|parent| parent.kind() == "program")
        })
        .collect()
}

/// The first top-level declaration carrying the `public` modifier.
pub fn first_public(file: &SourceFile) -> Option<Node<'_>> {
    top_level(file)
        .into_iter()
        .find(|declaration| has_modifier(*declaration, "public"))
}

/// The file's sole top-level class-like declaration; falls back to the
/// public one when the file declares several.
pub fn sole_top_level(file: &SourceFile) -> Result<Node<'_>, EngineError> {
    let declarations = top_level(file);
    match declarations.as_slice() {
        [] => Err(EngineError::not_found("a top-level type declaration")),
        [single] => Ok(*single),
        _ => first_public(file)
            .ok_or_else(|| EngineError::not_found("a public type among several declarations")),
    }
}

pub fn find_by_name<'a>(file: &'a SourceFile, name: &str) -> Option<Node<'a>> {
    declarations(file)
        .into_iter()
        .find(|declaration| declared_name(file, *declaration).as_deref() == Some(name))
}

pub fn name_node(declaration: Node<'_>) -> Option<Node<'_>> {
    declaration.child_by_field_name("name")
}

pub fn declared_name(file: &SourceFile, declaration: Node<'_>) -> Option<String> {
    name_node(declaration).map(|name| file.node_text(name).to_string())
}

/// Whether the declaration's modifier list carries a bare keyword such as
/// `public` or `static`.
pub fn has_modifier(declaration: Node<'_>, keyword: &str) -> bool {
    let Some(modifiers) = annotation::modifiers_of(declaration) else {
        return false;
    };
    let mut cursor = modifiers.walk();
    modifiers.children(&mut cursor).any(|child| child.kind() == keyword)
}

/// Simple name of the extended supertype, generics stripped:
/// `extends Auditable<Long>` yields `Auditable`.
pub fn superclass_name(file: &SourceFile, declaration: Node<'_>) -> Option<String> {
    let superclass = declaration.child_by_field_name("superclass")?;
    let mut cursor = superclass.walk();
    let supertype = superclass.named_children(&mut cursor).next()?;
    let text = file.node_text(supertype);
    let simple = text.split('<').next().unwrap_or(text).trim();
    // A scoped supertype keeps only its final segment.
    Some(simple.rsplit('.').next().unwrap_or(simple).to_string())
}

pub fn body_node(declaration: Node<'_>) -> Option<Node<'_>> {
    declaration.child_by_field_name("body")
}

pub fn fields_of(declaration: Node<'_>) -> Vec<Node<'_>> {
    members_of(declaration, "field_declaration")
}

pub fn methods_of(declaration: Node<'_>) -> Vec<Node<'_>> {
    members_of(declaration, "method_declaration")
}

fn members_of<'a>(declaration: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let Some(body) = body_node(declaration) else {
        return Vec::new();
    };
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|member| member.kind() == kind)
        .collect()
}

/// Where to place an inserted member.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MemberPosition {
    First,
    Last,
    At(usize),
}

/// Insert a rendered field declaration into the body of the named class.
/// `rendered` may span several lines (annotations above the declaration);
/// lines are re-indented to match the surrounding members.
pub fn insert_field(
    file: &mut SourceFile,
    class_name: &str,
    rendered: &str,
    position: MemberPosition,
) -> Result<(), EngineError> {
    let (insert_at, indent, lead, trail) = {
        let declaration = find_by_name(file, class_name)
            .ok_or_else(|| EngineError::not_found(format!("class '{class_name}'")))?;
        let body = body_node(declaration)
            .ok_or_else(|| EngineError::not_found(format!("body of class '{class_name}'")))?;
        let fields = fields_of(declaration);

        let indent = fields
            .first()
            .map(|field| annotation::line_indent(file.source(), field.start_byte()))
            .unwrap_or_else(|| {
                let class_indent =
                    annotation::line_indent(file.source(), declaration.start_byte());
                format!("{class_indent}    ")
            });

        let before_member = format!("\n{indent}");
        match (position, fields.as_slice()) {
            (MemberPosition::First, [first, ..]) => {
                (first.start_byte(), indent, String::new(), before_member)
            }
            (MemberPosition::At(index), members) if index < members.len() => {
                (members[index].start_byte(), indent, String::new(), before_member)
            }
            (MemberPosition::Last, [.., last]) => {
                (last.end_byte(), indent, before_member, String::new())
            }
            // Empty body, or an index past the end: insert right after `{`.
            _ => {
                let open = body.start_byte() + 1;
                let single_line = !file.node_text(body).contains('\n');
                let trail = if single_line { "\n".to_string() } else { String::new() };
                (open, indent, before_member, trail)
            }
        }
    };

    let body_text = format!("{lead}{}{trail}", rendered.replace('\n', &format!("\n{indent}")));
    file.insert(insert_at, &body_text)
}

/// Rename the declared type and every usage of its name in this file, in
/// one pass. `this.<name>` field accesses keep their meaning under a type
/// rename and are left alone. Returns the number of renamed identifiers.
pub fn rename(file: &mut SourceFile, old: &str, new: &str) -> Result<usize, EngineError> {
    if find_by_name(file, old).is_none() {
        return Err(EngineError::not_found(format!("class '{old}'")));
    }

    let pattern = format!(r#"([(identifier) (type_identifier)] @id (#eq? @id "{old}"))"#);
    let edits: Vec<_> = run_query(file, &pattern)
        .nodes()
        .into_iter()
        .filter(|node| !is_this_field_access(*node))
        .map(|node| (node.byte_range(), new.to_string()))
        .collect();

    let count = edits.len();
    file.apply_edits(edits)?;
    Ok(count)
}

/// True when the identifier is the field of a `this.<name>` access.
fn is_this_field_access(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    parent.kind() == "field_access"
        && parent
            .child_by_field_name("field")
            .is_some_and(|field| field.id() == node.id())
        && parent
            .child_by_field_name("object")
            .is_some_and(|object| object.kind() == "this")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::SupportedLanguage;

    fn parse(source: &str) -> SourceFile {
        SourceFile::from_source(SupportedLanguage::Java, source).unwrap()
    }

    #[test]
    fn finds_declarations_by_kind_and_name() {
        let file = parse(
            "package com.x;\n\npublic class A {}\n\ninterface B {}\n\nenum C { ONE }\n",
        );
        assert_eq!(declarations(&file).len(), 3);
        assert_eq!(top_level(&file).len(), 3);
        let public = first_public(&file).unwrap();
        assert_eq!(declared_name(&file, public).as_deref(), Some("A"));
        assert!(find_by_name(&file, "C").is_some());
        assert!(find_by_name(&file, "Z").is_none());
    }

    #[test]
    fn reads_superclass_simple_name() {
        let file = parse("class Order extends Auditable<Long> {}\n");
        let order = find_by_name(&file, "Order").unwrap();
        assert_eq!(superclass_name(&file, order).as_deref(), Some("Auditable"));

        let plain = parse("class Order {}\n");
        let order = find_by_name(&plain, "Order").unwrap();
        assert_eq!(superclass_name(&plain, order), None);
    }

    #[test]
    fn inserts_field_after_last_member() {
        let mut file = parse("public class A {\n    private int x;\n}\n");
        insert_field(&mut file, "A", "private int y;", MemberPosition::Last).unwrap();
        assert_eq!(
            file.source(),
            "public class A {\n    private int x;\n    private int y;\n}\n"
        );
    }

    #[test]
    fn inserts_field_into_empty_body() {
        let mut file = parse("public class A {\n}\n");
        insert_field(&mut file, "A", "private int x;", MemberPosition::Last).unwrap();
        assert_eq!(file.source(), "public class A {\n    private int x;\n}\n");
    }

    #[test]
    fn inserts_field_first_before_existing_members() {
        let mut file = parse("public class A {\n    private int x;\n}\n");
        insert_field(&mut file, "A", "private int y;", MemberPosition::First).unwrap();
        assert_eq!(
            file.source(),
            "public class A {\n    private int y;\n    private int x;\n}\n"
        );
    }

    #[test]
    fn rename_touches_declaration_and_usages() {
        let mut file = parse(
            "public class Original {\n    Original next;\n\n    Original copy() {\n        return new Original();\n    }\n}\n",
        );
        let count = rename(&mut file, "Original", "Renamed").unwrap();
        assert_eq!(count, 4);
        assert!(!file.source().contains("Original"));
        assert!(find_by_name(&file, "Renamed").is_some());
    }

    #[test]
    fn rename_spares_this_field_access() {
        let mut file = parse(
            "public class Original {\n    int Original;\n\n    void keep() {\n        this.Original = 1;\n    }\n}\n",
        );
        rename(&mut file, "Original", "Renamed").unwrap();
        assert!(file.source().contains("this.Original = 1;"));
        assert!(file.source().contains("public class Renamed {"));
    }
}
