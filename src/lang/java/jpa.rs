// SPDX-License-Identifier: Apache-2.0

//! Relational-mapping helpers: the recognized annotation vocabulary, mapped
//! class tests, and the id-field search up the supertype chain.

use crate::error::EngineError;
use crate::project;
use crate::source::SourceFile;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use tree_sitter::Node;

use super::{annotation, class, field, package, types::JavaType};

/// The mapping annotations the engine recognizes. Each variant knows its
/// simple name and import path.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingAnnotation {
    Entity,
    Table,
    MappedSuperclass,
    Id,
    GeneratedValue,
    Column,
    JoinColumn,
    OneToOne,
    ManyToOne,
}

impl MappingAnnotation {
    pub const ALL: &[MappingAnnotation] = &[
        MappingAnnotation::Entity,
        MappingAnnotation::Table,
        MappingAnnotation::MappedSuperclass,
        MappingAnnotation::Id,
        MappingAnnotation::GeneratedValue,
        MappingAnnotation::Column,
        MappingAnnotation::JoinColumn,
        MappingAnnotation::OneToOne,
        MappingAnnotation::ManyToOne,
    ];

    pub fn simple_name(&self) -> &'static str {
        match self {
            MappingAnnotation::Entity => "Entity",
            MappingAnnotation::Table => "Table",
            MappingAnnotation::MappedSuperclass => "MappedSuperclass",
            MappingAnnotation::Id => "Id",
            MappingAnnotation::GeneratedValue => "GeneratedValue",
            MappingAnnotation::Column => "Column",
            MappingAnnotation::JoinColumn => "JoinColumn",
            MappingAnnotation::OneToOne => "OneToOne",
            MappingAnnotation::ManyToOne => "ManyToOne",
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("jakarta.persistence.{}", self.simple_name())
    }

    pub fn from_simple_name(name: &str) -> Option<MappingAnnotation> {
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.simple_name() == name)
    }
}

/// The generic repository supertype generated repositories extend.
pub const REPOSITORY_TYPE: &str = "JpaRepository";
pub const REPOSITORY_IMPORT: &str = "org.springframework.data.jpa.repository.JpaRepository";

/// A class is mapped iff its declaration carries the entity marker.
pub fn is_mapped_class(file: &SourceFile, declaration: Node<'_>) -> bool {
    annotation::has_annotation(file, declaration, MappingAnnotation::Entity.simple_name())
}

pub fn is_mapped_superclass(file: &SourceFile, declaration: Node<'_>) -> bool {
    annotation::has_annotation(
        file,
        declaration,
        MappingAnnotation::MappedSuperclass.simple_name(),
    )
}

/// Recognized mapping annotations present on a declaration.
pub fn recognized_annotations(file: &SourceFile, declaration: Node<'_>) -> Vec<MappingAnnotation> {
    annotation::annotations_of(declaration)
        .into_iter()
        .filter_map(|node| MappingAnnotation::from_simple_name(&annotation::simple_name(file, node)))
        .collect()
}

/// The field carrying the id marker, by name and declared type.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IdField {
    pub name: String,
    pub type_name: String,
}

/// Search one class for a field annotated with the id marker.
pub fn id_field(file: &SourceFile, declaration: Node<'_>) -> Option<IdField> {
    class::fields_of(declaration)
        .into_iter()
        .find(|candidate| {
            annotation::has_annotation(file, *candidate, MappingAnnotation::Id.simple_name())
        })
        .map(|found| IdField {
            name: field::name_of(file, found).unwrap_or_default(),
            type_name: field::simple_type_of(file, found).unwrap_or_default(),
        })
}

/// Search a class and its supertype chain for the id field. Supertypes are
/// located by simple name among the project's source files; when the chain
/// reaches a type outside the project the caller gets a
/// [`EngineError::MissingExternalSymbol`] naming it, unless its source was
/// supplied up front.
pub fn id_field_in_hierarchy(
    project_root: &Path,
    file: &SourceFile,
    class_name: &str,
    supplied_source: Option<&str>,
) -> Result<IdField, EngineError> {
    let language = file.language();
    let supplied = supplied_source
        .map(|source| SourceFile::from_source(language, source))
        .transpose()?;

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(class_name.to_string());

    let mut step = inspect(file, class_name)?;
    loop {
        match step {
            Step::Found(found) => return Ok(found),
            Step::End => {
                return Err(EngineError::not_found(format!(
                    "an id field in the hierarchy of '{class_name}'"
                )));
            }
            Step::Extends(parent) => {
                if !visited.insert(parent.clone()) {
                    return Err(EngineError::invalid(format!(
                        "supertype cycle through '{parent}'"
                    )));
                }
                debug!(supertype = %parent, "id search follows extends clause");
                if let Some(project_file) = locate_type(project_root, language, &parent)? {
                    step = inspect(&project_file, &parent)?;
                } else if let Some(supplied) = supplied
                    .as_ref()
                    .filter(|candidate| class::find_by_name(candidate, &parent).is_some())
                {
                    step = inspect(supplied, &parent)?;
                } else {
                    return Err(EngineError::MissingExternalSymbol { symbol: parent });
                }
            }
        }
    }
}

enum Step {
    Found(IdField),
    Extends(String),
    End,
}

fn inspect(file: &SourceFile, class_name: &str) -> Result<Step, EngineError> {
    let declaration = class::find_by_name(file, class_name)
        .ok_or_else(|| EngineError::not_found(format!("class '{class_name}'")))?;
    if let Some(found) = id_field(file, declaration) {
        return Ok(Step::Found(found));
    }
    Ok(match class::superclass_name(file, declaration) {
        Some(parent) => Step::Extends(parent),
        None => Step::End,
    })
}

/// Open the project file declaring a type of this simple name. The file
/// stem must match, the conventional one-type-per-file layout.
fn locate_type(
    project_root: &Path,
    language: crate::lang::SupportedLanguage,
    simple_name: &str,
) -> Result<Option<SourceFile>, EngineError> {
    for path in project::source_files(project_root, language)? {
        if path.file_stem().and_then(|stem| stem.to_str()) != Some(simple_name) {
            continue;
        }
        let candidate = SourceFile::open(language, &path)?;
        if class::find_by_name(&candidate, simple_name).is_some() {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Package the declaring file resolves a simple type name to: an explicit
/// import wins, then the known basic types, then the file's own package.
pub fn resolve_type_package(file: &SourceFile, simple_name: &str) -> Option<String> {
    let dotted = format!(".{simple_name}");
    if let Some(imported) = super::imports::paths(file)
        .into_iter()
        .find(|path| path.ends_with(&dotted))
    {
        return imported
            .rsplit_once('.')
            .map(|(package, _)| package.to_string());
    }
    if let Some(known) = JavaType::from_simple_name(simple_name) {
        return Some(known.package().to_string());
    }
    package::name(file)
}
