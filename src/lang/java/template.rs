// SPDX-License-Identifier: Apache-2.0

//! File templates for freshly generated types.

/// Which kind of type declaration a new file starts with.
#[derive(Debug, Clone, Copy, Eq, PartialEq, clap::ValueEnum)]
pub enum TemplateKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// Render a compilation unit declaring one public type.
pub fn render(package: &str, name: &str, kind: TemplateKind) -> String {
    let declaration = match kind {
        TemplateKind::Class => format!("public class {name} {{\n}}"),
        TemplateKind::Interface => format!("public interface {name} {{\n}}"),
        TemplateKind::Enum => format!("public enum {name} {{\n}}"),
        TemplateKind::Record => format!("public record {name}() {{\n}}"),
        TemplateKind::Annotation => format!("public @interface {name} {{\n}}"),
    };
    if package.is_empty() {
        format!("{declaration}\n")
    } else {
        format!("package {package};\n\n{declaration}\n")
    }
}
