// SPDX-License-Identifier: Apache-2.0

//! Import declarations: lookup, alphabetical insertion, removal.

use crate::error::EngineError;
use crate::query::run_query;
use crate::source::SourceFile;
use tree_sitter::Node;

use super::package;

const IMPORT_QUERY: &str = "(import_declaration) @import";

pub fn import_nodes(file: &SourceFile) -> Vec<Node<'_>> {
    run_query(file, IMPORT_QUERY).nodes()
}

/// The dotted path of an import declaration, wildcard suffix included:
/// `import static java.util.Collections.emptyList;` yields
/// `java.util.Collections.emptyList`.
pub fn import_path(file: &SourceFile, node: Node<'_>) -> String {
    let body = file
        .node_text(node)
        .trim_start_matches("import")
        .trim_start();
    body.strip_prefix("static ")
        .unwrap_or(body)
        .trim_end_matches(';')
        .trim()
        .replace(char::is_whitespace, "")
}

pub fn paths(file: &SourceFile) -> Vec<String> {
    import_nodes(file)
        .into_iter()
        .map(|node| import_path(file, node))
        .collect()
}

/// Whether `qualified` is visible through an existing import, either
/// exactly or via a wildcard on its package.
pub fn is_imported(file: &SourceFile, qualified: &str) -> bool {
    let wildcard = qualified
        .rsplit_once('.')
        .map(|(package, _)| format!("{package}.*"));
    paths(file)
        .iter()
        .any(|path| path == qualified || wildcard.as_deref() == Some(path.as_str()))
}

/// Add `import <qualified>;` at its alphabetical position, after the
/// package declaration and before the first type declaration. Adding an
/// already-present import leaves the source unchanged; the return value
/// says whether the buffer was touched.
pub fn add_import(file: &mut SourceFile, qualified: &str) -> Result<bool, EngineError> {
    if qualified.is_empty() {
        return Err(EngineError::invalid("import path must be non-empty"));
    }
    if is_imported(file, qualified) {
        return Ok(false);
    }

    let statement = format!("import {qualified};");
    let insertion = insertion_point(file, qualified);
    match insertion {
        Insertion::BeforeImport(at) => file.insert(at, &format!("{statement}\n"))?,
        Insertion::AfterImport(at) => file.insert(at, &format!("\n{statement}"))?,
        Insertion::AfterPackage(at) => file.insert(at, &format!("\n\n{statement}"))?,
        Insertion::TopOfFile => file.insert(0, &format!("{statement}\n\n"))?,
    }
    Ok(true)
}

/// Remove an import by its fully qualified name. Returns whether an import
/// was removed.
pub fn remove_import(file: &mut SourceFile, qualified: &str) -> Result<bool, EngineError> {
    let range = import_nodes(file).into_iter().find_map(|node| {
        (import_path(file, node) == qualified).then(|| node.byte_range())
    });
    let Some(range) = range else {
        return Ok(false);
    };
    // Take the trailing newline with the statement.
    let mut end = range.end;
    if file.source().as_bytes().get(end) == Some(&b'\n') {
        end += 1;
    }
    file.replace_range(range.start, end, "")?;
    Ok(true)
}

enum Insertion {
    /// Before the import starting at this byte.
    BeforeImport(usize),
    /// After the import ending at this byte.
    AfterImport(usize),
    /// After the package declaration ending at this byte.
    AfterPackage(usize),
    TopOfFile,
}

fn insertion_point(file: &SourceFile, qualified: &str) -> Insertion {
    let imports = import_nodes(file);
    if let Some(successor) = imports
        .iter()
        .find(|node| import_path(file, **node).as_str() > qualified)
    {
        return Insertion::BeforeImport(successor.start_byte());
    }
    if let Some(last) = imports.last() {
        return Insertion::AfterImport(last.end_byte());
    }
    if let Some(package) = package::name_node(file) {
        let declaration_end = package
            .parent()
            .map(|declaration| declaration.end_byte())
            .unwrap_or_else(|| package.end_byte());
        return Insertion::AfterPackage(declaration_end);
    }
    // No package, no imports: the type declarations start at the top.
    Insertion::TopOfFile
}
