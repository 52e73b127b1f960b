// SPDX-License-Identifier: Apache-2.0

//! Describe a mapped class: id type, recommended repository, id options.

use crate::envelope::{Envelope, SymbolSourceRequest};
use crate::error::EngineError;
use crate::lang::SupportedLanguage;
use crate::lang::java::types::JavaType;
use crate::lang::java::{class, jpa, package};
use crate::source::SourceFile;
use serde::Serialize;
use std::path::PathBuf;

use super::{CwdArg, decode_source, require_dir, require_file_under};

#[derive(clap::Args, Debug)]
pub struct MappedClassInfoArgs {
    #[command(flatten)]
    pub cwd: CwdArg,

    /// File declaring the mapped class
    #[arg(long)]
    pub file_path: PathBuf,

    /// Base64 source of a supertype that lives outside the project
    #[arg(long)]
    pub superclass_source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedClassInfo {
    pub file_path: PathBuf,
    pub class_name: String,
    pub package: String,
    pub id_type: String,
    pub id_type_package: String,
    pub repository_name: String,
    pub repository_package: String,
    /// Qualified names of the types that make sensible ids.
    pub recommended_id_types: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InfoPayload {
    Info(Box<MappedClassInfo>),
    SymbolSource(SymbolSourceRequest),
}

pub fn run(language: SupportedLanguage, args: &MappedClassInfoArgs) -> Envelope<InfoPayload> {
    match execute(language, args) {
        Ok(info) => Envelope::success(InfoPayload::Info(Box::new(info))),
        Err(EngineError::MissingExternalSymbol { symbol }) => {
            let reason = EngineError::MissingExternalSymbol {
                symbol: symbol.clone(),
            }
            .to_string();
            let request = SymbolSourceRequest::for_symbol(symbol);
            Envelope::error_with(reason, InfoPayload::SymbolSource(request))
        }
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn execute(
    language: SupportedLanguage,
    args: &MappedClassInfoArgs,
) -> Result<MappedClassInfo, EngineError> {
    let cwd = require_dir(&args.cwd.cwd)?;
    let target = require_file_under(&cwd, &args.file_path)?;
    let supplied = args
        .superclass_source
        .as_deref()
        .map(|encoded| decode_source("--superclass-source", encoded))
        .transpose()?;

    let file = SourceFile::open(language, &target)?;
    let declaration = class::sole_top_level(&file)?;
    let class_name = class::declared_name(&file, declaration)
        .ok_or_else(|| EngineError::not_found("name of the top-level class"))?;
    if !jpa::is_mapped_class(&file, declaration) {
        return Err(EngineError::invalid(format!(
            "--file-path does not declare a mapped class: '{class_name}' has no @Entity marker"
        )));
    }

    let id = jpa::id_field_in_hierarchy(&cwd, &file, &class_name, supplied.as_deref())?;
    let file_package = package::name(&file).unwrap_or_default();
    let id_type_package = jpa::resolve_type_package(&file, &id.type_name).unwrap_or_default();

    Ok(MappedClassInfo {
        file_path: target,
        repository_name: format!("{class_name}Repository"),
        repository_package: file_package.clone(),
        class_name,
        package: file_package,
        id_type: id.type_name,
        id_type_package,
        recommended_id_types: JavaType::recommended_id_types()
            .map(|ty| ty.qualified_name())
            .collect(),
    })
}
