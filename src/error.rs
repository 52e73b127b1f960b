// SPDX-License-Identifier: Apache-2.0

//! Failure taxonomy shared by the semantic services and the command layer.
//!
//! Services return `Result<_, EngineError>`; only the outermost command
//! service converts the error into a response envelope.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or malformed caller input. The message names the offending
    /// field or value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A queried construct is absent from the source under inspection.
    #[error("{0} not found")]
    NotFound(String),

    /// The supertype chain left the project. Carries the simple name of the
    /// missing type so the caller can retry with its source.
    #[error("source for type '{symbol}' is not part of this project")]
    MissingExternalSymbol { symbol: String },

    /// The target file already exists and will not be overwritten.
    #[error("File already exists: {}", path.display())]
    Conflict { path: PathBuf },

    /// Read, write, rename, or parse failed.
    #[error("i/o failure: {0}")]
    Io(String),

    /// The requested language is not built into this binary.
    #[error("language '{0}' is not supported")]
    Unsupported(String),
}

impl EngineError {
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidInput(detail.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
