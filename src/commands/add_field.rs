// SPDX-License-Identifier: Apache-2.0

//! Add a field, with its annotations and imports, to the file's top-level
//! class.

use crate::envelope::Envelope;
use crate::error::EngineError;
use crate::lang::SupportedLanguage;
use crate::lang::java::types::JavaType;
use crate::lang::java::{class, field, imports, jpa};
use crate::source::SourceFile;
use serde::Serialize;
use std::path::PathBuf;

use super::{
    CwdArg, decode_source, require_dir, require_file_under, validate_identifier,
    validate_type_text,
};

#[derive(clap::Args, Debug)]
pub struct AddFieldArgs {
    #[command(flatten)]
    pub cwd: CwdArg,

    /// File whose top-level class receives the field
    #[arg(long)]
    pub file_path: PathBuf,

    /// Base64 of the editor's unsaved buffer, parsed instead of the
    /// on-disk content
    #[arg(long)]
    pub source: Option<String>,

    /// Name of the new field
    #[arg(long)]
    pub field_name: String,

    /// Declared type of the new field, e.g. `String` or `java.util.UUID`
    #[arg(long)]
    pub field_type: String,

    /// Modifier keywords in declaration order
    #[arg(long, value_delimiter = ',', default_value = "private")]
    pub modifiers: Vec<String>,

    /// Marker annotations placed above the field, by simple name
    #[arg(long = "annotation")]
    pub annotations: Vec<String>,

    /// Column name override; triggers a column annotation
    #[arg(long)]
    pub column_name: Option<String>,

    /// Column length constraint
    #[arg(long)]
    pub length: Option<u32>,

    /// Column nullability constraint
    #[arg(long)]
    pub nullable: Option<bool>,

    /// Column uniqueness constraint
    #[arg(long)]
    pub unique: Option<bool>,

    /// Initializer expression for the field
    #[arg(long)]
    pub initializer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedFieldPayload {
    pub file_path: PathBuf,
}

pub fn run(language: SupportedLanguage, args: &AddFieldArgs) -> Envelope<AddedFieldPayload> {
    match execute(language, args) {
        Ok(file_path) => Envelope::success(AddedFieldPayload { file_path }),
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn execute(language: SupportedLanguage, args: &AddFieldArgs) -> Result<PathBuf, EngineError> {
    let cwd = require_dir(&args.cwd.cwd)?;
    let target = require_file_under(&cwd, &args.file_path)?;
    validate_identifier("--field-name", &args.field_name)?;
    validate_type_text("--field-type", &args.field_type)?;
    for annotation in &args.annotations {
        validate_identifier("--annotation", annotation)?;
    }

    let mut file = match &args.source {
        Some(encoded) => {
            let text = decode_source("--source", encoded)?;
            SourceFile::from_source(language, text)?.with_path(target.clone())
        }
        None => SourceFile::open(language, &target)?,
    };

    let class_name = {
        let declaration = class::sole_top_level(&file)?;
        let name = class::declared_name(&file, declaration)
            .ok_or_else(|| EngineError::not_found("name of the top-level class"))?;
        if field::find(&file, declaration, &args.field_name).is_some() {
            return Err(EngineError::invalid(format!(
                "--field-name already declared in class '{name}': '{}'",
                args.field_name
            )));
        }
        name
    };

    let rendered = render_member(args);
    class::insert_field(&mut file, &class_name, &rendered, class::MemberPosition::Last)?;

    add_required_imports(&mut file, args)?;
    file.save()?;
    Ok(target)
}

/// Annotation lines above the declaration line, ready for re-indentation.
fn render_member(args: &AddFieldArgs) -> String {
    let mut lines: Vec<String> = args
        .annotations
        .iter()
        .map(|name| field::render_annotation(name, &[]))
        .collect();
    if let Some(column) = render_column(args) {
        lines.push(column);
    }
    lines.push(field::render(
        &args.modifiers,
        &args.field_type,
        &args.field_name,
        args.initializer.as_deref(),
    ));
    lines.join("\n")
}

/// The column annotation, when any column option was given. Arguments keep
/// a fixed order: name, length, nullable, unique.
fn render_column(args: &AddFieldArgs) -> Option<String> {
    let mut arguments: Vec<(&str, String)> = Vec::new();
    if let Some(name) = &args.column_name {
        arguments.push(("name", format!("\"{name}\"")));
    }
    if let Some(length) = args.length {
        arguments.push(("length", length.to_string()));
    }
    if let Some(nullable) = args.nullable {
        arguments.push(("nullable", nullable.to_string()));
    }
    if let Some(unique) = args.unique {
        arguments.push(("unique", unique.to_string()));
    }
    if arguments.is_empty() {
        return None;
    }
    Some(field::render_annotation(
        jpa::MappingAnnotation::Column.simple_name(),
        &arguments,
    ))
}

fn add_required_imports(file: &mut SourceFile, args: &AddFieldArgs) -> Result<(), EngineError> {
    // The declared type, when it is a known library type outside java.lang.
    let simple = args
        .field_type
        .split('<')
        .next()
        .unwrap_or(&args.field_type);
    if !simple.contains('.')
        && let Some(known) = JavaType::from_simple_name(simple)
        && known.needs_import()
    {
        imports::add_import(file, &known.qualified_name())?;
    }

    for name in &args.annotations {
        if let Some(known) = jpa::MappingAnnotation::from_simple_name(name) {
            imports::add_import(file, &known.qualified_name())?;
        }
    }
    if render_column(args).is_some() {
        imports::add_import(file, &jpa::MappingAnnotation::Column.qualified_name())?;
    }
    Ok(())
}
