// SPDX-License-Identifier: Apache-2.0

//! Project scan for mapped classes and mapped superclasses.

use crate::envelope::Envelope;
use crate::error::EngineError;
use crate::lang::SupportedLanguage;
use crate::lang::java::jpa::MappingAnnotation;
use crate::lang::java::{class, jpa, package};
use crate::project;
use crate::source::SourceFile;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;
use tree_sitter::Node;

use super::{CwdArg, require_dir};

#[derive(clap::Args, Debug)]
pub struct MappedClassesArgs {
    #[command(flatten)]
    pub cwd: CwdArg,
}

/// Denormalized view of one mapped declaration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedClassDescriptor {
    pub file_path: PathBuf,
    pub class_name: String,
    pub package: String,
    /// Simple name of the id field's type, when the id is resolvable
    /// without leaving the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_type_package: Option<String>,
    /// Recognized mapping annotations present on the declaration.
    pub annotations: Vec<MappingAnnotation>,
}

pub fn run_mapped_classes(
    language: SupportedLanguage,
    args: &MappedClassesArgs,
) -> Envelope<Vec<MappedClassDescriptor>> {
    run_with(language, args, jpa::is_mapped_class)
}

pub fn run_mapped_superclasses(
    language: SupportedLanguage,
    args: &MappedClassesArgs,
) -> Envelope<Vec<MappedClassDescriptor>> {
    run_with(language, args, jpa::is_mapped_superclass)
}

fn run_with(
    language: SupportedLanguage,
    args: &MappedClassesArgs,
    marker: fn(&SourceFile, Node<'_>) -> bool,
) -> Envelope<Vec<MappedClassDescriptor>> {
    match scan(language, args, marker) {
        Ok(descriptors) => Envelope::success(descriptors),
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn scan(
    language: SupportedLanguage,
    args: &MappedClassesArgs,
    marker: fn(&SourceFile, Node<'_>) -> bool,
) -> Result<Vec<MappedClassDescriptor>, EngineError> {
    let cwd = require_dir(&args.cwd.cwd)?;
    let mut descriptors = Vec::new();
    for path in project::source_files(&cwd, language)? {
        let file = match SourceFile::open(language, &path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable source file");
                continue;
            }
        };
        let file_package = package::name(&file).unwrap_or_default();
        for declaration in class::top_level(&file) {
            if !marker(&file, declaration) {
                continue;
            }
            let Some(class_name) = class::declared_name(&file, declaration) else {
                continue;
            };
            // Best effort: a chain leaving the project simply yields no id.
            let id = jpa::id_field_in_hierarchy(&cwd, &file, &class_name, None).ok();
            descriptors.push(MappedClassDescriptor {
                file_path: path.clone(),
                id_type_package: id
                    .as_ref()
                    .and_then(|id| jpa::resolve_type_package(&file, &id.type_name)),
                id_type: id.map(|id| id.type_name),
                class_name,
                package: file_package.clone(),
                annotations: jpa::recognized_annotations(&file, declaration),
            });
        }
    }
    Ok(descriptors)
}
