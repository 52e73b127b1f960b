// SPDX-License-Identifier: Apache-2.0

//! Rename a declared type, its in-file usages, and its file.

use crate::envelope::Envelope;
use crate::error::EngineError;
use crate::lang::SupportedLanguage;
use crate::lang::java::ident::{self, IdentifierRole};
use crate::lang::java::class;
use crate::source::SourceFile;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use super::{CwdArg, require_dir, require_file_under, validate_identifier};

#[derive(clap::Args, Debug)]
pub struct RenameTypeArgs {
    #[command(flatten)]
    pub cwd: CwdArg,

    /// File declaring the type
    #[arg(long)]
    pub file_path: PathBuf,

    /// New simple name for the type
    #[arg(long)]
    pub new_name: String,

    /// 1-based line of the identifier under the cursor
    #[arg(long)]
    pub line: usize,

    /// 1-based column of the identifier under the cursor
    #[arg(long)]
    pub column: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamedTypePayload {
    pub file_path: PathBuf,
}

pub fn run(language: SupportedLanguage, args: &RenameTypeArgs) -> Envelope<RenamedTypePayload> {
    match execute(language, args) {
        Ok(file_path) => Envelope::success(RenamedTypePayload { file_path }),
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn execute(language: SupportedLanguage, args: &RenameTypeArgs) -> Result<PathBuf, EngineError> {
    let cwd = require_dir(&args.cwd.cwd)?;
    let target = require_file_under(&cwd, &args.file_path)?;
    validate_identifier("--new-name", &args.new_name)?;

    let mut file = SourceFile::open(language, &target)?;
    let old_name = {
        let node = file.node_at(args.line, args.column)?;
        if ident::classify(node) != Some(IdentifierRole::ClassName) {
            return Err(EngineError::invalid(format!(
                "identifier at {}:{} is not a class name",
                args.line, args.column
            )));
        }
        file.node_text(node).to_string()
    };

    if old_name == args.new_name {
        return Ok(target);
    }

    let renamed = class::rename(&mut file, &old_name, &args.new_name)?;
    info!(%old_name, new_name = %args.new_name, renamed, "renamed type in file");

    // When the renamed type is the file's eponymous public type, the file
    // follows it.
    let file_owns_type = target
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem == old_name);
    if file_owns_type && is_principal_type(&file, &args.new_name) {
        file.rename_file(&args.new_name)?;
    }

    file.save()
}

fn is_principal_type(file: &SourceFile, name: &str) -> bool {
    let Some(declaration) = class::find_by_name(file, name) else {
        return false;
    };
    class::has_modifier(declaration, "public") || class::top_level(file).len() == 1
}
