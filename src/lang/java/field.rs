// SPDX-License-Identifier: Apache-2.0

//! Field declarations: descriptors, lookup, and rendering.

use crate::source::SourceFile;
use tree_sitter::Node;

use super::annotation;

/// Denormalized view of one field declaration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_name: String,
    pub modifiers: Vec<String>,
    pub annotations: Vec<String>,
    /// Column metadata, when a column annotation is present.
    pub column: Option<ColumnSpec>,
}

/// Constraint metadata read from a column annotation's arguments.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct ColumnSpec {
    pub name: Option<String>,
    pub length: Option<u32>,
    pub nullable: Option<bool>,
    pub unique: Option<bool>,
}

/// Column metadata of a field, parsed from its `@Column` arguments. The
/// single-value form `@Column("name")` answers as the name.
pub fn column_of(file: &SourceFile, field: Node<'_>) -> Option<ColumnSpec> {
    let column = annotation::find(file, field, "Column")?;
    Some(ColumnSpec {
        name: annotation::argument(file, column, "name").map(unquote),
        length: annotation::argument(file, column, "length")
            .and_then(|value| value.parse().ok()),
        nullable: annotation::argument(file, column, "nullable")
            .and_then(|value| value.parse().ok()),
        unique: annotation::argument(file, column, "unique")
            .and_then(|value| value.parse().ok()),
    })
}

fn unquote(value: String) -> String {
    value.trim_matches('"').to_string()
}

/// Name of the first declarator. Java allows `int a, b;`; the engine reads
/// and writes one declarator per field.
pub fn name_of(file: &SourceFile, field: Node<'_>) -> Option<String> {
    field
        .child_by_field_name("declarator")
        .and_then(|declarator| declarator.child_by_field_name("name"))
        .map(|name| file.node_text(name).to_string())
}

/// Declared type text, e.g. `List<String>`.
pub fn type_of(file: &SourceFile, field: Node<'_>) -> Option<String> {
    field
        .child_by_field_name("type")
        .map(|ty| file.node_text(ty).to_string())
}

/// Simple name of the declared type, generics and arrays stripped.
pub fn simple_type_of(file: &SourceFile, field: Node<'_>) -> Option<String> {
    type_of(file, field).map(|ty| {
        let base = ty.split('<').next().unwrap_or(&ty);
        let base = base.split('[').next().unwrap_or(base);
        base.rsplit('.').next().unwrap_or(base).trim().to_string()
    })
}

pub fn find<'a>(file: &SourceFile, class: Node<'a>, name: &str) -> Option<Node<'a>> {
    super::class::fields_of(class)
        .into_iter()
        .find(|field| name_of(file, *field).as_deref() == Some(name))
}

pub fn descriptor(file: &SourceFile, field: Node<'_>) -> FieldDescriptor {
    let modifiers = annotation::modifiers_of(field)
        .map(|modifiers| {
            let mut cursor = modifiers.walk();
            modifiers
                .children(&mut cursor)
                .filter(|child| !child.is_named())
                .map(|keyword| keyword.kind().to_string())
                .collect()
        })
        .unwrap_or_default();
    let annotations = annotation::annotations_of(field)
        .into_iter()
        .map(|node| annotation::simple_name(file, node))
        .collect();
    FieldDescriptor {
        name: name_of(file, field).unwrap_or_default(),
        type_name: type_of(file, field).unwrap_or_default(),
        modifiers,
        annotations,
        column: column_of(file, field),
    }
}

/// Render a field declaration line from its parts.
pub fn render(
    modifiers: &[String],
    type_name: &str,
    name: &str,
    initializer: Option<&str>,
) -> String {
    let mut line = String::new();
    for modifier in modifiers {
        line.push_str(modifier);
        line.push(' ');
    }
    line.push_str(type_name);
    line.push(' ');
    line.push_str(name);
    if let Some(initializer) = initializer {
        line.push_str(" = ");
        line.push_str(initializer);
    }
    line.push(';');
    line
}

/// Render an annotation with ordered named arguments:
/// `render_annotation("Column", &[("name", "\"created_at\"")])` yields
/// `@Column(name = "created_at")`. An empty argument list renders a marker.
pub fn render_annotation(name: &str, arguments: &[(&str, String)]) -> String {
    if arguments.is_empty() {
        return format!("@{name}");
    }
    let body = arguments
        .iter()
        .map(|(key, value)| {
            if key.is_empty() {
                value.clone()
            } else {
                format!("{key} = {value}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("@{name}({body})")
}

/// Natural variable name for a type: lower the first character, so `User`
/// becomes `user` and `URL` becomes `uRL`.
pub fn natural_variable_name(type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
