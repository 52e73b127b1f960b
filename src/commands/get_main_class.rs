// SPDX-License-Identifier: Apache-2.0

//! Locate the class holding the conventional program entry point.

use crate::envelope::Envelope;
use crate::error::EngineError;
use crate::lang::SupportedLanguage;
use crate::lang::java::{class, method, package};
use crate::project;
use crate::source::SourceFile;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use super::{CwdArg, require_dir};

#[derive(clap::Args, Debug)]
pub struct GetMainClassArgs {
    #[command(flatten)]
    pub cwd: CwdArg,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MainClassPayload {
    pub file_path: PathBuf,
    pub class_name: String,
    pub package: String,
}

pub fn run(language: SupportedLanguage, args: &GetMainClassArgs) -> Envelope<MainClassPayload> {
    match execute(language, args) {
        Ok(payload) => Envelope::success(payload),
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn execute(
    language: SupportedLanguage,
    args: &GetMainClassArgs,
) -> Result<MainClassPayload, EngineError> {
    let cwd = require_dir(&args.cwd.cwd)?;
    for path in project::source_files(&cwd, language)? {
        let file = match SourceFile::open(language, &path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable source file");
                continue;
            }
        };
        let Some(declaration) = class::first_public(&file) else {
            continue;
        };
        if method::entry_point(&file, declaration).is_some() {
            return Ok(MainClassPayload {
                class_name: class::declared_name(&file, declaration)
                    .ok_or_else(|| EngineError::not_found("name of the main class"))?,
                package: package::name(&file).unwrap_or_default(),
                file_path: path,
            });
        }
    }
    Err(EngineError::not_found(
        "a public class with a main(String[]) method",
    ))
}
