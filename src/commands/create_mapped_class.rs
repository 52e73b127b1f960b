// SPDX-License-Identifier: Apache-2.0

//! Create an entity class mapped to a snake_case table.

use crate::envelope::Envelope;
use crate::error::EngineError;
use crate::lang::java::template::TemplateKind;
use crate::lang::java::{annotation, class, field, imports, jpa};
use crate::lang::{SourceKind, SupportedLanguage};
use crate::project;
use crate::source::SourceFile;
use heck::ToSnakeCase;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use super::create_file;
use super::{CwdArg, require_dir, validate_identifier, validate_package};

#[derive(clap::Args, Debug)]
pub struct CreateMappedClassArgs {
    #[command(flatten)]
    pub cwd: CwdArg,

    /// Package the entity is declared in
    #[arg(long)]
    pub package: String,

    /// Simple name of the entity; doubles as the file name
    #[arg(long)]
    pub file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedFilePayload {
    pub file_path: PathBuf,
}

pub fn run(
    language: SupportedLanguage,
    args: &CreateMappedClassArgs,
) -> Envelope<CreatedFilePayload> {
    match execute(language, args) {
        Ok(file_path) => Envelope::success(CreatedFilePayload { file_path }),
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn execute(
    language: SupportedLanguage,
    args: &CreateMappedClassArgs,
) -> Result<PathBuf, EngineError> {
    let cwd = require_dir(&args.cwd.cwd)?;
    validate_package(&args.package)?;
    let type_name = create_file::type_name_of(language, &args.file_name).to_string();
    validate_identifier("--file-name", &type_name)?;

    if let Some(existing) = find_mapped_class(language, &cwd, &type_name)? {
        return Err(EngineError::Conflict { path: existing });
    }

    let path = create_file::create(
        language,
        &cwd,
        &args.package,
        &type_name,
        TemplateKind::Class,
        SourceKind::Main,
    )?;

    let mut file = SourceFile::open(language, &path)?;
    let declaration_start = class::find_by_name(&file, &type_name)
        .ok_or_else(|| EngineError::not_found(format!("class '{type_name}' in the new file")))?
        .start_byte();

    let table = type_name.to_snake_case();
    let lines = vec![
        field::render_annotation(jpa::MappingAnnotation::Entity.simple_name(), &[]),
        field::render_annotation(
            jpa::MappingAnnotation::Table.simple_name(),
            &[("name", format!("\"{table}\""))],
        ),
    ];
    annotation::insert_above(&mut file, declaration_start, &lines)?;

    imports::add_import(&mut file, &jpa::MappingAnnotation::Entity.qualified_name())?;
    imports::add_import(&mut file, &jpa::MappingAnnotation::Table.qualified_name())?;
    file.save()?;
    Ok(path)
}

/// Path of an existing mapped class with this simple name, anywhere in the
/// project.
fn find_mapped_class(
    language: SupportedLanguage,
    cwd: &std::path::Path,
    type_name: &str,
) -> Result<Option<PathBuf>, EngineError> {
    for path in project::source_files(cwd, language)? {
        let file = match SourceFile::open(language, &path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable source file");
                continue;
            }
        };
        let duplicated = class::top_level(&file).into_iter().any(|declaration| {
            jpa::is_mapped_class(&file, declaration)
                && class::declared_name(&file, declaration).as_deref() == Some(type_name)
        });
        if duplicated {
            return Ok(Some(path));
        }
    }
    Ok(None)
}
