// SPDX-License-Identifier: Apache-2.0

//! Project walking and path containment.
//!
//! Every path the engine writes to must canonicalize to a descendant of the
//! working directory; [`contained_path`] is the single implementation of
//! that check.

use crate::error::EngineError;
use crate::lang::{SourceKind, SupportedLanguage};
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

/// All source files of the language under `root`, in deterministic order.
/// Hidden directories and conventional build outputs are skipped.
pub fn source_files(
    root: &Path,
    language: SupportedLanguage,
) -> Result<Vec<PathBuf>, EngineError> {
    let extension = language.extension();
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
    for entry in walker {
        let entry = entry.map_err(|err| EngineError::Io(err.to_string()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(OsStr::to_str) == Some(extension)
        {
            files.push(entry.into_path());
        }
    }
    trace!(count = files.len(), root = %root.display(), "enumerated source files");
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|name| {
            name.starts_with('.') || matches!(name, "target" | "build" | "out" | "node_modules")
        })
}

/// First directory under `root` ending in the language's conventional source
/// layout (e.g. `src/main/java`), or that layout joined under `root` when
/// the project does not have one yet.
pub fn find_source_root(root: &Path, language: SupportedLanguage, kind: SourceKind) -> PathBuf {
    let layout = language.source_layout(kind);
    let suffix = Path::new(layout);
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
    for entry in walker.flatten() {
        if entry.file_type().is_dir() && entry.path().ends_with(suffix) {
            return entry.into_path();
        }
    }
    root.join(layout)
}

/// Canonical form of `path`, which must stay inside `root`.
///
/// Targets that do not exist yet are handled by canonicalizing the deepest
/// existing ancestor and appending the remainder lexically; `..` and `.`
/// components in the remainder are rejected rather than resolved. Symlinks
/// in the existing part are resolved, so a link pointing outside the root
/// fails the check.
pub fn contained_path(path: &Path, root: &Path) -> Result<PathBuf, EngineError> {
    let root = fs::canonicalize(root)
        .map_err(|err| EngineError::invalid(format!("working directory {}: {err}", root.display())))?;
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let mut existing = absolute.clone();
    let mut remainder: Vec<std::ffi::OsString> = Vec::new();
    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                remainder.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            _ => {
                return Err(EngineError::invalid(format!(
                    "path has no existing ancestor: {}",
                    absolute.display()
                )));
            }
        }
    }

    let mut canonical = fs::canonicalize(&existing)
        .map_err(|err| EngineError::Io(format!("canonicalize {}: {err}", existing.display())))?;
    for part in remainder.iter().rev() {
        match Path::new(part).components().next() {
            Some(Component::Normal(_)) => canonical.push(part),
            _ => {
                return Err(EngineError::invalid(format!(
                    "path traversal in {}",
                    absolute.display()
                )));
            }
        }
    }

    if !canonical.starts_with(&root) {
        return Err(EngineError::invalid(format!(
            "path {} escapes the working directory {}",
            canonical.display(),
            root.display()
        )));
    }
    Ok(canonical)
}
