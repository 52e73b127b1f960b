// SPDX-License-Identifier: Apache-2.0

//! Parsed source file: owns the text buffer together with its concrete
//! syntax tree and keeps the two in agreement across edits.
//!
//! Node handles borrow from the file, so the borrow checker guarantees that
//! no handle survives a mutation. Callers that need positions across an edit
//! must snapshot byte ranges first and re-query afterwards.

use crate::error::EngineError;
use crate::lang::SupportedLanguage;
use crate::project;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;
use tree_sitter::{InputEdit, Node, Parser, Point, Tree};

pub struct SourceFile {
    language: SupportedLanguage,
    parser: Parser,
    source: String,
    tree: Tree,
    path: Option<PathBuf>,
    pending_move: Option<PathBuf>,
}

impl SourceFile {
    /// Parse in-memory source text.
    pub fn from_source(
        language: SupportedLanguage,
        source: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let source = source.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|err| EngineError::Io(format!("grammar rejected by parser: {err}")))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| EngineError::Io("parser produced no tree".into()))?;
        Ok(Self {
            language,
            parser,
            source,
            tree,
            path: None,
            pending_move: None,
        })
    }

    /// Read a file from disk as UTF-8, newlines preserved bit-for-bit.
    pub fn open(language: SupportedLanguage, path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        let source = fs::read_to_string(&path)
            .map_err(|err| EngineError::Io(format!("read {}: {err}", path.display())))?;
        let mut file = Self::from_source(language, source)?;
        file.path = Some(path);
        Ok(file)
    }

    /// Associate an on-disk path, e.g. when the content came from an
    /// editor's unsaved buffer rather than the file itself.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Text covered by a node of this file's tree.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    /// Splice `replacement` over `[start, end)` and re-parse, feeding the
    /// old tree to the parser as an incremental hint. All node handles and
    /// byte offsets held by callers are invalidated.
    pub fn replace_range(
        &mut self,
        start: usize,
        end: usize,
        replacement: &str,
    ) -> Result<(), EngineError> {
        self.check_range(start, end)?;

        let start_position = self.point_at(start);
        let old_end_position = self.point_at(end);
        self.source.replace_range(start..end, replacement);
        let new_end_byte = start + replacement.len();
        let new_end_position = self.point_at(new_end_byte);

        self.tree.edit(&InputEdit {
            start_byte: start,
            old_end_byte: end,
            new_end_byte,
            start_position,
            old_end_position,
            new_end_position,
        });
        let tree = self
            .parser
            .parse(&self.source, Some(&self.tree))
            .ok_or_else(|| EngineError::Io("re-parse after edit produced no tree".into()))?;
        self.tree = tree;
        Ok(())
    }

    /// Zero-length replace at `at`.
    pub fn insert(&mut self, at: usize, text: &str) -> Result<(), EngineError> {
        self.replace_range(at, at, text)
    }

    /// Replace a node's extent. The mutable borrow retires every node
    /// handle, so callers snapshot `node.byte_range()` first.
    pub fn replace_node(
        &mut self,
        node_range: Range<usize>,
        replacement: &str,
    ) -> Result<(), EngineError> {
        self.replace_range(node_range.start, node_range.end, replacement)
    }

    /// Insert immediately before a node's extent.
    pub fn insert_before(&mut self, node_range: Range<usize>, text: &str) -> Result<(), EngineError> {
        self.insert(node_range.start, text)
    }

    /// Insert immediately after a node's extent.
    pub fn insert_after(&mut self, node_range: Range<usize>, text: &str) -> Result<(), EngineError> {
        self.insert(node_range.end, text)
    }

    /// Apply a batch of non-overlapping byte-range replacements in one
    /// splice pass with a single re-parse. Used by whole-file renames.
    pub fn apply_edits(&mut self, mut edits: Vec<(Range<usize>, String)>) -> Result<(), EngineError> {
        if edits.is_empty() {
            return Ok(());
        }
        edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        for pair in edits.windows(2) {
            // Sorted descending: the later edit in the buffer comes first.
            if pair[1].0.end > pair[0].0.start {
                return Err(EngineError::invalid(format!(
                    "overlapping edits at bytes {}..{} and {}..{}",
                    pair[1].0.start, pair[1].0.end, pair[0].0.start, pair[0].0.end
                )));
            }
        }
        for (range, replacement) in &edits {
            self.check_range(range.start, range.end)?;
            self.source.replace_range(range.clone(), replacement);
        }
        debug!(edits = edits.len(), "applied batch edit, full re-parse");
        let tree = self
            .parser
            .parse(&self.source, None)
            .ok_or_else(|| EngineError::Io("re-parse after batch edit produced no tree".into()))?;
        self.tree = tree;
        Ok(())
    }

    /// Smallest named node covering a 1-based (line, column) position.
    pub fn node_at(&self, line: usize, column: usize) -> Result<Node<'_>, EngineError> {
        if line == 0 || column == 0 {
            return Err(EngineError::invalid("line and column are 1-based"));
        }
        let point = Point::new(line - 1, column - 1);
        let root = self.root();
        if point >= root.end_position() {
            return Err(EngineError::not_found(format!("node at {line}:{column}")));
        }
        root.named_descendant_for_point_range(point, point)
            .filter(|node| node.start_position() <= point && point < node.end_position())
            .ok_or_else(|| EngineError::not_found(format!("node at {line}:{column}")))
    }

    /// Write the buffer to the file's path. Atomic at the file level: the
    /// content lands in a temporary sibling which is then renamed over the
    /// target. A pending move set by [`Self::rename_file`] is honored after
    /// the write, replacing any existing file at the destination.
    pub fn save(&mut self) -> Result<PathBuf, EngineError> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| EngineError::invalid("file has no on-disk path to save to"))?;
        write_atomic(&path, self.source.as_bytes())?;
        if let Some(target) = self.pending_move.take() {
            if target != path {
                if target.exists() {
                    fs::remove_file(&target)
                        .map_err(|err| EngineError::Io(format!("replace {}: {err}", target.display())))?;
                }
                fs::rename(&path, &target).map_err(|err| {
                    EngineError::Io(format!(
                        "rename {} -> {}: {err}",
                        path.display(),
                        target.display()
                    ))
                })?;
            }
            self.path = Some(target.clone());
            return Ok(target);
        }
        Ok(path)
    }

    /// Write the buffer to `path` after checking that it stays inside
    /// `containment_root`. This check is the engine's sole security
    /// perimeter; a symlink pointing outside the root fails it.
    pub fn save_as(
        &mut self,
        path: &Path,
        containment_root: &Path,
    ) -> Result<PathBuf, EngineError> {
        let target = project::contained_path(path, containment_root)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| EngineError::Io(format!("create {}: {err}", parent.display())))?;
        }
        write_atomic(&target, self.source.as_bytes())?;
        self.path = Some(target.clone());
        self.pending_move = None;
        Ok(target)
    }

    /// Defer a rename to the next save: same directory, new base name, the
    /// language extension appended when absent.
    pub fn rename_file(&mut self, new_name: &str) -> Result<(), EngineError> {
        let current = self
            .path
            .as_ref()
            .ok_or_else(|| EngineError::invalid("file has no on-disk path to rename"))?;
        let dir = current.parent().unwrap_or_else(|| Path::new("."));
        let extension = self.language.extension();
        let suffix = format!(".{extension}");
        let base_name = if new_name.ends_with(&suffix) {
            new_name.to_string()
        } else {
            format!("{new_name}{suffix}")
        };
        self.pending_move = Some(dir.join(base_name));
        Ok(())
    }

    pub fn pending_move(&self) -> Option<&Path> {
        self.pending_move.as_deref()
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), EngineError> {
        if start > end || end > self.source.len() {
            return Err(EngineError::invalid(format!(
                "byte range {start}..{end} is outside the buffer (len {})",
                self.source.len()
            )));
        }
        if !self.source.is_char_boundary(start) || !self.source.is_char_boundary(end) {
            return Err(EngineError::invalid(format!(
                "byte range {start}..{end} splits a UTF-8 character"
            )));
        }
        Ok(())
    }

    /// (row, column) of a byte offset in the current buffer, 0-based.
    fn point_at(&self, byte: usize) -> Point {
        let prefix = &self.source.as_bytes()[..byte];
        let row = prefix.iter().filter(|&&b| b == b'\n').count();
        let column = prefix
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|nl| byte - nl - 1)
            .unwrap_or(byte);
        Point::new(row, column)
    }
}

/// Climb parents until a node of `kind` is found.
pub fn ancestor_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if candidate.kind() == kind {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), EngineError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| EngineError::invalid(format!("not a file path: {}", path.display())))?;
    let staging = dir.join(format!(".{}.tmp", name.to_string_lossy()));
    fs::write(&staging, bytes)
        .map_err(|err| EngineError::Io(format!("write {}: {err}", staging.display())))?;
    fs::rename(&staging, path)
        .map_err(|err| EngineError::Io(format!("rename {}: {err}", path.display())))?;
    Ok(())
}
