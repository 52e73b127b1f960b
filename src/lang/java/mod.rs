// SPDX-License-Identifier: Apache-2.0

//! Semantic services for the Java dialect.
//!
//! One module per construct. Services are stateless functions over a
//! [`crate::source::SourceFile`]; Tree-Sitter queries live as constants at
//! the top of each module. See tree-sitter-java's
//! [node-types.json](https://github.com/tree-sitter/tree-sitter-java/blob/master/src/node-types.json)
//! for the grammar vocabulary they build on.

pub mod annotation;
pub mod class;
pub mod field;
pub mod ident;
pub mod imports;
pub mod jpa;
pub mod method;
pub mod package;
pub mod template;
pub mod types;
pub mod variable;
