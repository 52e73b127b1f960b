// SPDX-License-Identifier: Apache-2.0

//! Generate the repository interface for a mapped class.

use crate::envelope::{Envelope, SymbolSourceRequest};
use crate::error::EngineError;
use crate::lang::SupportedLanguage;
use crate::lang::java::{class, jpa, package};
use crate::source::SourceFile;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{CwdArg, decode_source, require_dir, require_file_under};

#[derive(clap::Args, Debug)]
pub struct CreateRepositoryArgs {
    #[command(flatten)]
    pub cwd: CwdArg,

    /// File declaring the mapped class
    #[arg(long)]
    pub file_path: PathBuf,

    /// Base64 source of a supertype that lives outside the project,
    /// supplied after a requires-symbol-source response
    #[arg(long)]
    pub superclass_source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RepositoryPayload {
    #[serde(rename_all = "camelCase")]
    Created { file_path: PathBuf },
    SymbolSource(SymbolSourceRequest),
}

pub fn run(
    language: SupportedLanguage,
    args: &CreateRepositoryArgs,
) -> Envelope<RepositoryPayload> {
    match execute(language, args) {
        Ok(file_path) => Envelope::success(RepositoryPayload::Created { file_path }),
        Err(EngineError::MissingExternalSymbol { symbol }) => {
            let reason = EngineError::MissingExternalSymbol {
                symbol: symbol.clone(),
            }
            .to_string();
            let request = SymbolSourceRequest::for_symbol(symbol);
            Envelope::error_with(reason, RepositoryPayload::SymbolSource(request))
        }
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn execute(
    language: SupportedLanguage,
    args: &CreateRepositoryArgs,
) -> Result<PathBuf, EngineError> {
    let cwd = require_dir(&args.cwd.cwd)?;
    let target = require_file_under(&cwd, &args.file_path)?;
    let supplied = args
        .superclass_source
        .as_deref()
        .map(|encoded| decode_source("--superclass-source", encoded))
        .transpose()?;

    let file = SourceFile::open(language, &target)?;
    let declaration = class::sole_top_level(&file)?;
    let entity = class::declared_name(&file, declaration)
        .ok_or_else(|| EngineError::not_found("name of the top-level class"))?;
    if !jpa::is_mapped_class(&file, declaration) {
        return Err(EngineError::invalid(format!(
            "--file-path does not declare a mapped class: '{entity}' has no @Entity marker"
        )));
    }

    let id = jpa::id_field_in_hierarchy(&cwd, &file, &entity, supplied.as_deref())?;
    let id_type = boxed_type_name(&id.type_name);

    let repository_name = format!("{entity}Repository");
    let directory = target
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.clone());
    let path = directory.join(format!("{repository_name}.{}", language.extension()));
    if path.exists() {
        return Err(EngineError::Conflict { path });
    }

    let entity_package = package::name(&file).unwrap_or_default();
    let source = render_repository(&file, &entity_package, &repository_name, &entity, &id_type);
    let mut repository = SourceFile::from_source(language, source)?;
    repository.save_as(&path, &cwd)
}

fn render_repository(
    entity_file: &SourceFile,
    entity_package: &str,
    repository_name: &str,
    entity: &str,
    id_type: &str,
) -> String {
    let mut import_paths = vec![jpa::REPOSITORY_IMPORT.to_string()];
    // The id type needs an import when it lives outside java.lang and
    // outside the repository's own package. The entity itself is a sibling,
    // never imported.
    if let Some(id_package) = jpa::resolve_type_package(entity_file, id_type)
        && id_package != "java.lang"
        && id_package != entity_package
    {
        import_paths.push(format!("{id_package}.{id_type}"));
    }
    import_paths.sort();

    let mut source = String::new();
    if !entity_package.is_empty() {
        source.push_str(&format!("package {entity_package};\n\n"));
    }
    for import in &import_paths {
        source.push_str(&format!("import {import};\n"));
    }
    source.push_str(&format!(
        "\npublic interface {repository_name} extends {repository}<{entity}, {id_type}> {{\n}}\n",
        repository = jpa::REPOSITORY_TYPE,
    ));
    source
}

/// Wrapper type for a primitive id, so the parameterization stays legal.
fn boxed_type_name(declared: &str) -> String {
    match declared {
        "long" => "Long",
        "int" => "Integer",
        "short" => "Short",
        "byte" => "Byte",
        "double" => "Double",
        "float" => "Float",
        "boolean" => "Boolean",
        "char" => "Character",
        other => other,
    }
    .to_string()
}
