// SPDX-License-Identifier: Apache-2.0

//! Annotations on classes, fields, and methods: lookup and argument access.
//!
//! The grammar distinguishes `marker_annotation` (`@Id`) from `annotation`
//! (`@Column(...)`); both carry a `name` field and live inside the
//! declaration's `modifiers` node.

use crate::error::EngineError;
use crate::source::SourceFile;
use tree_sitter::Node;

const ANNOTATION_KINDS: &[&str] = &["annotation", "marker_annotation"];

/// Annotations attached to a declaration, in source order.
pub fn annotations_of<'a>(declaration: Node<'a>) -> Vec<Node<'a>> {
    let Some(modifiers) = modifiers_of(declaration) else {
        return Vec::new();
    };
    let mut cursor = modifiers.walk();
    modifiers
        .named_children(&mut cursor)
        .filter(|child| ANNOTATION_KINDS.contains(&child.kind()))
        .collect()
}

/// The `modifiers` child of a declaration, which hosts both keywords and
/// annotations.
pub fn modifiers_of(declaration: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = declaration.walk();
    declaration
        .named_children(&mut cursor)
        .find(|child| child.kind() == "modifiers")
}

/// Simple name of an annotation: `@jakarta.persistence.Id` yields `Id`.
pub fn simple_name(file: &SourceFile, annotation: Node<'_>) -> String {
    let name = annotation
        .child_by_field_name("name")
        .map(|node| file.node_text(node))
        .unwrap_or_default();
    name.rsplit('.').next().unwrap_or(name).to_string()
}

pub fn find<'a>(
    file: &SourceFile,
    declaration: Node<'a>,
    wanted: &str,
) -> Option<Node<'a>> {
    annotations_of(declaration)
        .into_iter()
        .find(|annotation| simple_name(file, *annotation) == wanted)
}

pub fn has_annotation(file: &SourceFile, declaration: Node<'_>, wanted: &str) -> bool {
    find(file, declaration, wanted).is_some()
}

/// One argument of an annotation: `name` is `None` for the single-value
/// form `@Table("accounts")`, `Some` for `@Table(name = "accounts")`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AnnotationArgument {
    pub name: Option<String>,
    pub value: String,
}

/// Arguments in declaration order. Markers yield an empty list.
pub fn arguments(file: &SourceFile, annotation: Node<'_>) -> Vec<AnnotationArgument> {
    let Some(list) = annotation.child_by_field_name("arguments") else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .map(|child| match child.kind() {
            "element_value_pair" => AnnotationArgument {
                name: child
                    .child_by_field_name("key")
                    .map(|key| file.node_text(key).to_string()),
                value: child
                    .child_by_field_name("value")
                    .map(|value| file.node_text(value).to_string())
                    .unwrap_or_default(),
            },
            _ => AnnotationArgument {
                name: None,
                value: file.node_text(child).to_string(),
            },
        })
        .collect()
}

/// Value of a named argument, with the single-value form answering to the
/// conventional key `value`.
pub fn argument(file: &SourceFile, annotation: Node<'_>, key: &str) -> Option<String> {
    arguments(file, annotation).into_iter().find_map(|argument| {
        let matches = match &argument.name {
            Some(name) => name == key,
            None => key == "value",
        };
        matches.then_some(argument.value)
    })
}

/// Insert annotation lines directly above a declaration, matching its
/// indentation. `lines` are bare annotation texts such as `@Entity`.
pub fn insert_above(
    file: &mut SourceFile,
    declaration_start: usize,
    lines: &[String],
) -> Result<(), EngineError> {
    if lines.is_empty() {
        return Ok(());
    }
    let indent = line_indent(file.source(), declaration_start);
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
        text.push_str(&indent);
    }
    file.insert(declaration_start, &text)
}

/// Whitespace prefix of the line containing `byte`.
pub(crate) fn line_indent(source: &str, byte: usize) -> String {
    let line_start = source[..byte].rfind('\n').map(|nl| nl + 1).unwrap_or(0);
    source[line_start..byte]
        .chars()
        .take_while(|ch| ch.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::SupportedLanguage;
    use crate::lang::java::class;

    const SOURCE: &str = "\
package com.x;

@Entity
@Table(name = \"accounts\", schema = \"core\")
public class Account {
    @Column(\"owner_name\")
    private String owner;
}
";

    fn parse(source: &str) -> SourceFile {
        SourceFile::from_source(SupportedLanguage::Java, source).unwrap()
    }

    #[test]
    fn enumerates_marker_and_argumented_annotations() {
        let file = parse(SOURCE);
        let account = class::find_by_name(&file, "Account").unwrap();
        let names: Vec<String> = annotations_of(account)
            .into_iter()
            .map(|annotation| simple_name(&file, annotation))
            .collect();
        assert_eq!(names, vec!["Entity", "Table"]);
        assert!(has_annotation(&file, account, "Entity"));
        assert!(!has_annotation(&file, account, "Id"));
    }

    #[test]
    fn reads_key_value_arguments() {
        let file = parse(SOURCE);
        let account = class::find_by_name(&file, "Account").unwrap();
        let table = find(&file, account, "Table").unwrap();
        assert_eq!(argument(&file, table, "name").as_deref(), Some("\"accounts\""));
        assert_eq!(argument(&file, table, "schema").as_deref(), Some("\"core\""));
        assert_eq!(argument(&file, table, "catalog"), None);
    }

    #[test]
    fn reads_single_value_arguments_as_value() {
        let file = parse(SOURCE);
        let account = class::find_by_name(&file, "Account").unwrap();
        let field = class::fields_of(account)[0];
        let column = find(&file, field, "Column").unwrap();
        assert_eq!(
            argument(&file, column, "value").as_deref(),
            Some("\"owner_name\"")
        );
    }

    #[test]
    fn inserts_above_with_matching_indent() {
        let mut file = parse("public class A {\n    private int x;\n}\n");
        let field_start = {
            let class = class::find_by_name(&file, "A").unwrap();
            class::fields_of(class)[0].start_byte()
        };
        insert_above(&mut file, field_start, &["@Id".to_string()]).unwrap();
        assert_eq!(
            file.source(),
            "public class A {\n    @Id\n    private int x;\n}\n"
        );
    }
}
