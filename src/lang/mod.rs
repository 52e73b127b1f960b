// SPDX-License-Identifier: Apache-2.0

//! Host-language registry.
//!
//! A dialect is a Tree-Sitter grammar plus a semantic-service bundle that
//! knows its constructs (packages, imports, classes, fields, annotations).
//! Languages are feature-gated; Java is the built-in default.

#[cfg(feature = "lang-java")]
pub mod java;

use tree_sitter::Language;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SupportedLanguage {
    #[cfg(feature = "lang-java")]
    Java,
}

impl SupportedLanguage {
    /// Resolve a language by its command-line name. `None` means the binary
    /// was built without support for it.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            #[cfg(feature = "lang-java")]
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "lang-java")]
            Self::Java => "java",
        }
    }

    pub fn grammar(&self) -> Language {
        match self {
            #[cfg(feature = "lang-java")]
            Self::Java => tree_sitter_java::LANGUAGE.into(),
        }
    }

    /// Source file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            #[cfg(feature = "lang-java")]
            Self::Java => "java",
        }
    }

    /// Conventional source layout below a project root, e.g. `src/main/java`.
    pub fn source_layout(&self, kind: SourceKind) -> &'static str {
        match (self, kind) {
            #[cfg(feature = "lang-java")]
            (Self::Java, SourceKind::Main) => "src/main/java",
            #[cfg(feature = "lang-java")]
            (Self::Java, SourceKind::Test) => "src/test/java",
        }
    }
}

/// Which of the conventional source trees a generated file belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, clap::ValueEnum)]
pub enum SourceKind {
    Main,
    Test,
}
