// SPDX-License-Identifier: Apache-2.0

//! Create a source file from a type template.

use crate::envelope::Envelope;
use crate::error::EngineError;
use crate::lang::java::{package, template};
use crate::lang::java::template::TemplateKind;
use crate::lang::{SourceKind, SupportedLanguage};
use crate::source::SourceFile;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{CwdArg, require_dir, validate_identifier, validate_package};

#[derive(clap::Args, Debug)]
pub struct CreateFileArgs {
    #[command(flatten)]
    pub cwd: CwdArg,

    /// Package the new type is declared in
    #[arg(long)]
    pub package: String,

    /// Simple name of the new type; doubles as the file name
    #[arg(long)]
    pub file_name: String,

    /// Declaration the file starts with
    #[arg(long, value_enum)]
    pub template: TemplateKind,

    /// Which conventional source tree receives the file
    #[arg(long, value_enum, default_value = "main")]
    pub source_kind: SourceKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedFilePayload {
    pub file_path: PathBuf,
}

pub fn run(language: SupportedLanguage, args: &CreateFileArgs) -> Envelope<CreatedFilePayload> {
    match execute(language, args) {
        Ok(file_path) => Envelope::success(CreatedFilePayload { file_path }),
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn execute(language: SupportedLanguage, args: &CreateFileArgs) -> Result<PathBuf, EngineError> {
    let cwd = require_dir(&args.cwd.cwd)?;
    validate_package(&args.package)?;
    let type_name = type_name_of(language, &args.file_name);
    validate_identifier("--file-name", type_name)?;
    create(
        language,
        &cwd,
        &args.package,
        type_name,
        args.template,
        args.source_kind,
    )
}

/// Strip the language extension when the caller passed a file name.
pub(crate) fn type_name_of<'n>(language: SupportedLanguage, file_name: &'n str) -> &'n str {
    let suffix = format!(".{}", language.extension());
    file_name.strip_suffix(suffix.as_str()).unwrap_or(file_name)
}

/// Resolve the package directory, refuse to overwrite, render, save.
/// Shared with the mapped-class command.
pub(crate) fn create(
    language: SupportedLanguage,
    cwd: &Path,
    package_name: &str,
    type_name: &str,
    template: TemplateKind,
    source_kind: SourceKind,
) -> Result<PathBuf, EngineError> {
    let dir = package::resolve_directory(cwd, language, package_name, source_kind)?;
    let path = dir.join(format!("{type_name}.{}", language.extension()));
    if path.exists() {
        return Err(EngineError::Conflict { path });
    }
    let source = template::render(package_name, type_name, template);
    let mut file = SourceFile::from_source(language, source)?;
    let saved = file.save_as(&path, cwd)?;
    info!(path = %saved.display(), "created source file");
    Ok(saved)
}
