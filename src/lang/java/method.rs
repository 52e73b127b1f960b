// SPDX-License-Identifier: Apache-2.0

//! Method declarations and program-entry detection.

use crate::source::SourceFile;
use tree_sitter::Node;

use super::class;

pub fn name_of(file: &SourceFile, method: Node<'_>) -> Option<String> {
    method
        .child_by_field_name("name")
        .map(|name| file.node_text(name).to_string())
}

pub fn find<'a>(file: &SourceFile, declaration: Node<'a>, name: &str) -> Option<Node<'a>> {
    class::methods_of(declaration)
        .into_iter()
        .find(|method| name_of(file, *method).as_deref() == Some(name))
}

/// Formal parameters of a method, spread (varargs) parameters included.
pub fn parameters(method: Node<'_>) -> Vec<Node<'_>> {
    let Some(list) = method.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "formal_parameter" | "spread_parameter"))
        .collect()
}

/// The conventional program entry: `public static void main` taking a
/// single `String[]` (or `String...`) parameter.
pub fn is_entry_point(file: &SourceFile, method: Node<'_>) -> bool {
    if name_of(file, method).as_deref() != Some("main") {
        return false;
    }
    if !class::has_modifier(method, "public") || !class::has_modifier(method, "static") {
        return false;
    }
    if method
        .child_by_field_name("type")
        .is_none_or(|ty| ty.kind() != "void_type")
    {
        return false;
    }
    let parameters = parameters(method);
    let [parameter] = parameters.as_slice() else {
        return false;
    };
    parameter_is_string_array(file, *parameter)
}

fn parameter_is_string_array(file: &SourceFile, parameter: Node<'_>) -> bool {
    match parameter.kind() {
        "formal_parameter" => parameter
            .child_by_field_name("type")
            .is_some_and(|ty| {
                ty.kind() == "array_type"
                    && ty
                        .child_by_field_name("element")
                        .is_some_and(|element| file.node_text(element) == "String")
            }),
        "spread_parameter" => {
            let mut cursor = parameter.walk();
            parameter
                .named_children(&mut cursor)
                .any(|child| child.kind() == "type_identifier" && file.node_text(child) == "String")
        }
        _ => false,
    }
}

/// First method in the declaration that qualifies as the program entry.
pub fn entry_point<'a>(file: &SourceFile, declaration: Node<'a>) -> Option<Node<'a>> {
    class::methods_of(declaration)
        .into_iter()
        .find(|method| is_entry_point(file, *method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::SupportedLanguage;

    fn parse(source: &str) -> SourceFile {
        SourceFile::from_source(SupportedLanguage::Java, source).unwrap()
    }

    #[test]
    fn recognizes_the_conventional_main() {
        let file = parse(
            "public class App {\n    public static void main(String[] args) {}\n}\n",
        );
        let app = class::find_by_name(&file, "App").unwrap();
        assert!(entry_point(&file, app).is_some());
    }

    #[test]
    fn accepts_varargs_main() {
        let file = parse(
            "public class App {\n    public static void main(String... args) {}\n}\n",
        );
        let app = class::find_by_name(&file, "App").unwrap();
        assert!(entry_point(&file, app).is_some());
    }

    #[test]
    fn rejects_lookalikes() {
        let cases = [
            "class App { static void main(String[] args) {} }",
            "class App { public void main(String[] args) {} }",
            "class App { public static void main(String[] args, int extra) {} }",
            "class App { public static void main(int[] args) {} }",
            "class App { public static int main(String[] args) { return 0; } }",
        ];
        for source in cases {
            let file = parse(source);
            let app = class::find_by_name(&file, "App").unwrap();
            assert!(entry_point(&file, app).is_none(), "accepted: {source}");
        }
    }

    #[test]
    fn finds_methods_by_name() {
        let file = parse("class A {\n    void f() {}\n    void g() {}\n}\n");
        let class = class::find_by_name(&file, "A").unwrap();
        assert!(find(&file, class, "g").is_some());
        assert!(find(&file, class, "h").is_none());
    }
}
