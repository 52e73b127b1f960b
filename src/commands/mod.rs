// SPDX-License-Identifier: Apache-2.0

//! Command services: stateless composites that read inputs, drive the
//! semantic services, and answer with exactly one envelope.
//!
//! Input validation happens here, before any filesystem mutation; a
//! rejected input never touches the project.

pub mod add_field;
pub mod create_file;
pub mod create_mapped_class;
pub mod create_repository;
pub mod get_main_class;
pub mod mapped_class_info;
pub mod mapped_classes;
pub mod rename_type;

use crate::envelope::Envelope;
use crate::error::EngineError;
use crate::lang::SupportedLanguage;
use crate::project;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Subcommand;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Locate the class with the conventional program entry point
    GetMainClass(get_main_class::GetMainClassArgs),

    /// Create a source file from a type template
    CreateFile(create_file::CreateFileArgs),

    /// Create an entity class mapped to a table
    CreateMappedClass(create_mapped_class::CreateMappedClassArgs),

    /// Add a field to the file's top-level class
    AddField(add_field::AddFieldArgs),

    /// Generate the repository interface for a mapped class
    CreateRepository(create_repository::CreateRepositoryArgs),

    /// Rename a declared type, its in-file usages, and its file
    RenameType(rename_type::RenameTypeArgs),

    /// List every mapped class in the project
    GetMappedClasses(mapped_classes::MappedClassesArgs),

    /// List every mapped superclass in the project
    GetMappedSuperclasses(mapped_classes::MappedClassesArgs),

    /// Describe a mapped class: id type, recommended repository
    GetMappedClassInfo(mapped_class_info::MappedClassInfoArgs),
}

/// Run one command and serialize its envelope. Infallible by construction:
/// serialization problems degrade to an error envelope.
pub fn dispatch(language: SupportedLanguage, command: &Cmd) -> (String, u8) {
    match command {
        Cmd::GetMainClass(args) => finish(get_main_class::run(language, args)),
        Cmd::CreateFile(args) => finish(create_file::run(language, args)),
        Cmd::CreateMappedClass(args) => finish(create_mapped_class::run(language, args)),
        Cmd::AddField(args) => finish(add_field::run(language, args)),
        Cmd::CreateRepository(args) => finish(create_repository::run(language, args)),
        Cmd::RenameType(args) => finish(rename_type::run(language, args)),
        Cmd::GetMappedClasses(args) => {
            finish(mapped_classes::run_mapped_classes(language, args))
        }
        Cmd::GetMappedSuperclasses(args) => {
            finish(mapped_classes::run_mapped_superclasses(language, args))
        }
        Cmd::GetMappedClassInfo(args) => finish(mapped_class_info::run(language, args)),
    }
}

fn finish<T: Serialize>(envelope: Envelope<T>) -> (String, u8) {
    let code = envelope.exit_code();
    match serde_json::to_string(&envelope) {
        Ok(json) => (json, code),
        Err(err) => (
            format!(r#"{{"succeed":false,"errorReason":"envelope serialization failed: {err}"}}"#),
            1,
        ),
    }
}

/// Working directory taken by every command; doubles as the containment
/// root for writes.
#[derive(clap::Args, Debug, Clone)]
pub struct CwdArg {
    /// Project working directory; all writes stay inside it
    #[arg(long)]
    pub cwd: PathBuf,
}

pub(crate) fn require_dir(path: &Path) -> Result<PathBuf, EngineError> {
    if !path.is_dir() {
        return Err(EngineError::invalid(format!(
            "--cwd is not an existing directory: {}",
            path.display()
        )));
    }
    std::fs::canonicalize(path)
        .map_err(|err| EngineError::Io(format!("canonicalize {}: {err}", path.display())))
}

/// An existing file that canonicalizes to a descendant of `cwd`.
pub(crate) fn require_file_under(cwd: &Path, path: &Path) -> Result<PathBuf, EngineError> {
    let resolved = project::contained_path(path, cwd)?;
    if !resolved.is_file() {
        return Err(EngineError::invalid(format!(
            "--file-path does not exist: {}",
            resolved.display()
        )));
    }
    Ok(resolved)
}

fn package_regex() -> &'static Regex {
    static PACKAGE: OnceLock<Regex> = OnceLock::new();
    PACKAGE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
            .expect("literal regex")
    })
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("literal regex"))
}

fn type_name_regex() -> &'static Regex {
    static TYPE_NAME: OnceLock<Regex> = OnceLock::new();
    // Optionally qualified, with an optional single-level generic suffix.
    TYPE_NAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*(<[^<>]+>)?$")
            .expect("literal regex")
    })
}

pub(crate) fn validate_package(package: &str) -> Result<(), EngineError> {
    if package_regex().is_match(package) {
        Ok(())
    } else {
        Err(EngineError::invalid(format!(
            "--package is not a dotted identifier: '{package}'"
        )))
    }
}

pub(crate) fn validate_identifier(flag: &str, name: &str) -> Result<(), EngineError> {
    if identifier_regex().is_match(name) {
        Ok(())
    } else {
        Err(EngineError::invalid(format!(
            "{flag} is not an identifier: '{name}'"
        )))
    }
}

pub(crate) fn validate_type_text(flag: &str, name: &str) -> Result<(), EngineError> {
    if type_name_regex().is_match(name) {
        Ok(())
    } else {
        Err(EngineError::invalid(format!(
            "{flag} is not a type name: '{name}'"
        )))
    }
}

/// Decode a base64-transported source buffer.
pub(crate) fn decode_source(flag: &str, encoded: &str) -> Result<String, EngineError> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|err| EngineError::invalid(format!("{flag} is not valid base64: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| EngineError::invalid(format!("{flag} is not UTF-8 source: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_grammar() {
        assert!(validate_package("com.example.app").is_ok());
        assert!(validate_package("single").is_ok());
        assert!(validate_package("com..x").is_err());
        assert!(validate_package("com.1x").is_err());
        assert!(validate_package("").is_err());
    }

    #[test]
    fn identifier_grammar() {
        assert!(validate_identifier("--file-name", "User").is_ok());
        assert!(validate_identifier("--file-name", "_tmp$1").is_ok());
        assert!(validate_identifier("--file-name", "1x").is_err());
        assert!(validate_identifier("--file-name", "a b").is_err());
    }

    #[test]
    fn type_text_grammar() {
        assert!(validate_type_text("--field-type", "String").is_ok());
        assert!(validate_type_text("--field-type", "java.util.UUID").is_ok());
        assert!(validate_type_text("--field-type", "List<String>").is_ok());
        assert!(validate_type_text("--field-type", "List<").is_err());
    }

    #[test]
    fn base64_decoding_round_trips() {
        use base64::Engine as _;
        let encoded = super::BASE64.encode("class A {}");
        assert_eq!(decode_source("--source", &encoded).unwrap(), "class A {}");
        assert!(decode_source("--source", "not base64!!").is_err());
    }
}
