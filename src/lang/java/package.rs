// SPDX-License-Identifier: Apache-2.0

//! Package declarations and package-to-directory resolution.

use crate::error::EngineError;
use crate::lang::{SourceKind, SupportedLanguage};
use crate::project;
use crate::query::run_query;
use crate::source::SourceFile;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

const PACKAGE_QUERY: &str = "(package_declaration [(scoped_identifier) (identifier)] @name)";

/// The file's package declaration name node, if declared. Java allows at
/// most one.
pub fn name_node(file: &SourceFile) -> Option<Node<'_>> {
    run_query(file, PACKAGE_QUERY).first_node()
}

/// Fully qualified package name, e.g. `com.example.app`.
pub fn name(file: &SourceFile) -> Option<String> {
    name_node(file).map(|node| file.node_text(node).to_string())
}

/// Split a qualified package name into its leading scope and final segment:
/// `com.example.app` becomes `("com.example", "app")`; a single segment has
/// an empty scope.
pub fn split(qualified: &str) -> (&str, &str) {
    qualified
        .rsplit_once('.')
        .unwrap_or(("", qualified))
}

/// Directory a package maps to under the project's conventional source
/// root. The directory is not created here; callers create it when they
/// write. The result always passes the containment check.
pub fn resolve_directory(
    root: &Path,
    language: SupportedLanguage,
    package: &str,
    kind: SourceKind,
) -> Result<PathBuf, EngineError> {
    let mut dir = project::find_source_root(root, language, kind);
    for segment in package.split('.') {
        dir.push(segment);
    }
    project::contained_path(&dir, root)
}
