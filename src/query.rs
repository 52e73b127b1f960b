// SPDX-License-Identifier: Apache-2.0

//! Pattern queries over the concrete syntax tree.
//!
//! Patterns use the S-expression query syntax of the underlying grammar,
//! with `@name` captures. Extended predicates are written as parenthesized
//! siblings of the pattern:
//!
//! ```text
//! (method_declaration name: (identifier) @name (#match? @name "^get"))
//! ```
//!
//! The predicate groups are stripped from the text before the structural
//! pattern is compiled, and evaluated here against the captures of each
//! match. Supported: `#eq?` / `#not-eq?` (string or capture-to-capture),
//! `#match?` / `#not-match?` (partial regex), `#any-of?` / `#not-any-of?`,
//! `#contains?`, and `#is?` with the node properties `definition`,
//! `reference`, and `local`.

use crate::error::EngineError;
use crate::lang::SupportedLanguage;
use crate::source::SourceFile;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};
use tracing::warn;

/// A compiled pattern plus its extended predicates.
pub struct TreeQuery {
    query: Query,
    predicates: Vec<Predicate>,
    main_capture: Option<String>,
}

impl TreeQuery {
    pub fn compile(language: SupportedLanguage, pattern: &str) -> Result<Self, EngineError> {
        let (stripped, raw_predicates) = strip_predicates(pattern);
        let query = Query::new(&language.grammar(), &stripped)
            .map_err(|err| EngineError::invalid(format!("query pattern: {err}")))?;
        let predicates = raw_predicates
            .iter()
            .map(|raw| parse_predicate(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let main_capture = trailing_capture(&stripped);
        Ok(Self {
            query,
            predicates,
            main_capture,
        })
    }

    pub fn run<'a>(&self, file: &'a SourceFile) -> QueryResults<'a> {
        self.run_at(file, file.root())
    }

    pub fn run_at<'a>(&self, file: &'a SourceFile, root: Node<'a>) -> QueryResults<'a> {
        let names = self.query.capture_names();
        let mut collected = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, root, file.source().as_bytes());
        while let Some(found) = matches.next() {
            let captures: Vec<(String, Node<'a>)> = found
                .captures
                .iter()
                .map(|capture| (names[capture.index as usize].to_string(), capture.node))
                .collect();
            let candidate = Match { captures };
            if self
                .predicates
                .iter()
                .all(|predicate| predicate.holds(file, &candidate))
            {
                collected.push(candidate);
            }
        }
        QueryResults {
            matches: collected,
            main_capture: self.main_capture.clone(),
        }
    }
}

/// Compile and run in one step. A pattern that fails to compile yields an
/// empty result; command services treat that as "not found".
pub fn run_query<'a>(file: &'a SourceFile, pattern: &str) -> QueryResults<'a> {
    run_query_at(file, file.root(), pattern)
}

pub fn run_query_at<'a>(file: &'a SourceFile, root: Node<'a>, pattern: &str) -> QueryResults<'a> {
    match TreeQuery::compile(file.language(), pattern) {
        Ok(query) => query.run_at(file, root),
        Err(err) => {
            warn!(%err, "query did not compile, returning no matches");
            QueryResults {
                matches: Vec::new(),
                main_capture: None,
            }
        }
    }
}

/// One match: captured nodes in capture order.
#[derive(Debug, Clone)]
pub struct Match<'a> {
    captures: Vec<(String, Node<'a>)>,
}

impl<'a> Match<'a> {
    pub fn node(&self, capture: &str) -> Option<Node<'a>> {
        self.captures
            .iter()
            .find(|(name, _)| name == capture)
            .map(|(_, node)| *node)
    }

    pub fn captures(&self) -> &[(String, Node<'a>)] {
        &self.captures
    }

    /// The representative node: the main capture when the pattern ends with
    /// one, otherwise the widest capture whose name does not start with `_`.
    fn primary(&self, main_capture: Option<&str>) -> Option<Node<'a>> {
        if let Some(name) = main_capture
            && let Some(node) = self.node(name)
        {
            return Some(node);
        }
        self.captures
            .iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .max_by_key(|(_, node)| node.end_byte() - node.start_byte())
            .map(|(_, node)| *node)
    }
}

/// Lazy-ish result set with the fluent projections commands build on.
pub struct QueryResults<'a> {
    matches: Vec<Match<'a>>,
    main_capture: Option<String>,
}

impl<'a> QueryResults<'a> {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn matches(&self) -> &[Match<'a>] {
        &self.matches
    }

    /// Primary node of each match, de-duplicated, stably sorted by start byte.
    pub fn nodes(&self) -> Vec<Node<'a>> {
        let main = self.main_capture.as_deref();
        let mut seen = HashSet::new();
        let mut nodes: Vec<Node<'a>> = self
            .matches
            .iter()
            .filter_map(|found| found.primary(main))
            .filter(|node| seen.insert(node.id()))
            .collect();
        nodes.sort_by_key(|node| node.start_byte());
        nodes
    }

    /// All nodes of one capture across matches, in source order.
    pub fn nodes_from(&self, capture: &str) -> Vec<Node<'a>> {
        let mut seen = HashSet::new();
        let mut nodes: Vec<Node<'a>> = self
            .matches
            .iter()
            .filter_map(|found| found.node(capture))
            .filter(|node| seen.insert(node.id()))
            .collect();
        nodes.sort_by_key(|node| node.start_byte());
        nodes
    }

    pub fn first_node(&self) -> Option<Node<'a>> {
        self.nodes().into_iter().next()
    }

    /// Exactly one primary node, or an error.
    pub fn single_node(&self) -> Result<Node<'a>, EngineError> {
        let nodes = self.nodes();
        match nodes.len() {
            1 => Ok(nodes[0]),
            count => Err(EngineError::not_found(format!(
                "exactly one match (found {count})"
            ))),
        }
    }

    pub fn filter(mut self, keep: impl Fn(&Match<'a>) -> bool) -> Self {
        self.matches.retain(|found| keep(found));
        self
    }

    pub fn map<T>(&self, project: impl Fn(&Match<'a>) -> T) -> Vec<T> {
        self.matches.iter().map(project).collect()
    }

    /// Stream the primary nodes without collecting projections.
    pub fn iter_nodes(&self) -> impl Iterator<Item = Node<'a>> + '_ {
        let main = self.main_capture.as_deref();
        self.matches.iter().filter_map(move |found| found.primary(main))
    }
}

#[derive(Debug)]
enum Operand {
    Literal(String),
    Capture(String),
}

#[derive(Debug)]
enum NodeProperty {
    Definition,
    Reference,
    Local,
}

#[derive(Debug)]
enum Predicate {
    TextEq {
        capture: String,
        operand: Operand,
        negated: bool,
    },
    TextMatch {
        capture: String,
        regex: Regex,
        negated: bool,
    },
    AnyOf {
        capture: String,
        values: Vec<String>,
        negated: bool,
    },
    Contains {
        capture: String,
        needle: String,
    },
    Is {
        capture: String,
        property: NodeProperty,
    },
}

impl Predicate {
    fn holds(&self, file: &SourceFile, found: &Match<'_>) -> bool {
        match self {
            Predicate::TextEq {
                capture,
                operand,
                negated,
            } => {
                let Some(node) = found.node(capture) else {
                    return *negated;
                };
                let text = file.node_text(node);
                let equal = match operand {
                    Operand::Literal(value) => text == value,
                    Operand::Capture(other) => found
                        .node(other)
                        .is_some_and(|other_node| file.node_text(other_node) == text),
                };
                equal != *negated
            }
            Predicate::TextMatch {
                capture,
                regex,
                negated,
            } => {
                let Some(node) = found.node(capture) else {
                    return *negated;
                };
                regex.is_match(file.node_text(node)) != *negated
            }
            Predicate::AnyOf {
                capture,
                values,
                negated,
            } => {
                let Some(node) = found.node(capture) else {
                    return *negated;
                };
                let text = file.node_text(node);
                values.iter().any(|value| value == text) != *negated
            }
            Predicate::Contains { capture, needle } => found
                .node(capture)
                .is_some_and(|node| file.node_text(node).contains(needle.as_str())),
            Predicate::Is { capture, property } => found
                .node(capture)
                .is_some_and(|node| property.holds(node)),
        }
    }
}

impl NodeProperty {
    fn holds(&self, node: Node<'_>) -> bool {
        match self {
            // The node is the declared name of its parent.
            NodeProperty::Definition => node
                .parent()
                .and_then(|parent| parent.child_by_field_name("name"))
                .is_some_and(|name| name.id() == node.id()),
            // A named leaf that is not itself a declared name.
            NodeProperty::Reference => {
                node.is_named()
                    && node.named_child_count() == 0
                    && !NodeProperty::Definition.holds(node)
            }
            // Inside a statement block rather than at declaration level.
            NodeProperty::Local => crate::source::ancestor_of_kind(node, "block").is_some(),
        }
    }
}

/// Split a pattern into its structural part and the raw predicate groups.
/// Predicate groups are parenthesized expressions whose first token starts
/// with `#`; string literals are respected while scanning.
fn strip_predicates(pattern: &str) -> (String, Vec<String>) {
    let bytes = pattern.as_bytes();
    let mut stripped = String::with_capacity(pattern.len());
    let mut predicates = Vec::new();
    let mut index = 0;

    while index < bytes.len() {
        let rest = &pattern[index..];
        if rest.starts_with('(') {
            let mut lookahead = index + 1;
            while lookahead < bytes.len() && bytes[lookahead].is_ascii_whitespace() {
                lookahead += 1;
            }
            if lookahead < bytes.len() && bytes[lookahead] == b'#' {
                if let Some(end) = balanced_group_end(pattern, index) {
                    predicates.push(pattern[index + 1..end].trim().to_string());
                    index = end + 1;
                    continue;
                }
            }
        }
        if rest.starts_with('"') {
            let end = string_literal_end(pattern, index);
            stripped.push_str(&pattern[index..end]);
            index = end;
            continue;
        }
        let ch = rest.chars().next().unwrap_or('\0');
        stripped.push(ch);
        index += ch.len_utf8();
    }

    (stripped, predicates)
}

/// Byte offset of the `)` closing the group opened at `open`, or `None`
/// when the pattern is unbalanced.
fn balanced_group_end(pattern: &str, open: usize) -> Option<usize> {
    let bytes = pattern.as_bytes();
    let mut depth = 0usize;
    let mut index = open;
    while index < bytes.len() {
        match bytes[index] {
            b'"' => {
                index = string_literal_end(pattern, index);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
        index += 1;
    }
    None
}

/// Byte offset just past a string literal starting at `open`.
fn string_literal_end(pattern: &str, open: usize) -> usize {
    let bytes = pattern.as_bytes();
    let mut index = open + 1;
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            b'"' => return index + 1,
            _ => index += 1,
        }
    }
    bytes.len()
}

fn parse_predicate(raw: &str) -> Result<Predicate, EngineError> {
    let tokens = tokenize(raw);
    let [operator, arguments @ ..] = tokens.as_slice() else {
        return Err(EngineError::invalid(format!("empty predicate: ({raw})")));
    };

    let capture_of = |token: &PredicateToken| -> Result<String, EngineError> {
        match token {
            PredicateToken::Capture(name) => Ok(name.clone()),
            PredicateToken::Literal(text) => Err(EngineError::invalid(format!(
                "predicate {operator} expects a @capture, got '{text}'",
                operator = operator.text()
            ))),
        }
    };

    match operator.text() {
        name @ ("#eq?" | "#not-eq?") => {
            let [capture, operand] = arguments else {
                return Err(EngineError::invalid(format!("{name} takes two arguments")));
            };
            let operand = match operand {
                PredicateToken::Capture(other) => Operand::Capture(other.clone()),
                PredicateToken::Literal(value) => Operand::Literal(value.clone()),
            };
            Ok(Predicate::TextEq {
                capture: capture_of(capture)?,
                operand,
                negated: name == "#not-eq?",
            })
        }
        name @ ("#match?" | "#not-match?") => {
            let [capture, pattern] = arguments else {
                return Err(EngineError::invalid(format!("{name} takes two arguments")));
            };
            let PredicateToken::Literal(pattern) = pattern else {
                return Err(EngineError::invalid(format!("{name} takes a regex string")));
            };
            let regex = Regex::new(pattern)
                .map_err(|err| EngineError::invalid(format!("{name} regex: {err}")))?;
            Ok(Predicate::TextMatch {
                capture: capture_of(capture)?,
                regex,
                negated: name == "#not-match?",
            })
        }
        name @ ("#any-of?" | "#not-any-of?") => {
            let [capture, values @ ..] = arguments else {
                return Err(EngineError::invalid(format!("{name} takes a capture")));
            };
            if values.is_empty() {
                return Err(EngineError::invalid(format!("{name} takes at least one value")));
            }
            Ok(Predicate::AnyOf {
                capture: capture_of(capture)?,
                values: values.iter().map(|token| token.text().to_string()).collect(),
                negated: name == "#not-any-of?",
            })
        }
        "#contains?" => {
            let [capture, needle] = arguments else {
                return Err(EngineError::invalid("#contains? takes two arguments"));
            };
            Ok(Predicate::Contains {
                capture: capture_of(capture)?,
                needle: needle.text().to_string(),
            })
        }
        "#is?" => {
            let [capture, property] = arguments else {
                return Err(EngineError::invalid("#is? takes two arguments"));
            };
            let property = match property.text() {
                "definition" => NodeProperty::Definition,
                "reference" => NodeProperty::Reference,
                "local" => NodeProperty::Local,
                other => {
                    return Err(EngineError::invalid(format!(
                        "#is? does not know property '{other}'"
                    )));
                }
            };
            Ok(Predicate::Is {
                capture: capture_of(capture)?,
                property,
            })
        }
        other => Err(EngineError::invalid(format!("unknown predicate {other}"))),
    }
}

#[derive(Debug)]
enum PredicateToken {
    Capture(String),
    Literal(String),
}

impl PredicateToken {
    fn text(&self) -> &str {
        match self {
            PredicateToken::Capture(name) | PredicateToken::Literal(name) => name,
        }
    }
}

/// Split a predicate body into tokens: `@captures`, quoted strings (escapes
/// resolved), `/regex/` literals, and bare words.
fn tokenize(raw: &str) -> Vec<PredicateToken> {
    let mut tokens = Vec::new();
    let mut chars = raw.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }
        match ch {
            '"' => {
                let mut value = String::new();
                while let Some((_, ch)) = chars.next() {
                    match ch {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                value.push(match escaped {
                                    'n' => '\n',
                                    't' => '\t',
                                    other => other,
                                });
                            }
                        }
                        '"' => break,
                        other => value.push(other),
                    }
                }
                tokens.push(PredicateToken::Literal(value));
            }
            '/' => {
                let mut value = String::new();
                for (_, ch) in chars.by_ref() {
                    if ch == '/' {
                        break;
                    }
                    value.push(ch);
                }
                tokens.push(PredicateToken::Literal(value));
            }
            '@' => {
                let mut name = String::new();
                while let Some((_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-') {
                        name.push(*ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(PredicateToken::Capture(name));
            }
            _ => {
                let mut word = String::from(ch);
                while let Some((_, ch)) = chars.peek() {
                    if ch.is_whitespace() {
                        break;
                    }
                    word.push(*ch);
                    chars.next();
                }
                tokens.push(PredicateToken::Literal(word));
            }
        }
    }

    tokens
}

/// Name of the capture the pattern ends with, if any.
fn trailing_capture(stripped: &str) -> Option<String> {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    let trailing = TRAILING
        .get_or_init(|| Regex::new(r"@([A-Za-z_][A-Za-z0-9_.-]*)\s*$").expect("literal regex"));
    trailing
        .captures(stripped.trim_end())
        .map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_predicate_groups() {
        let pattern = r#"(method_declaration name: (identifier) @name (#match? @name "^get"))"#;
        let (stripped, predicates) = strip_predicates(pattern);
        assert_eq!(
            stripped,
            "(method_declaration name: (identifier) @name )"
        );
        assert_eq!(predicates, vec![r##"#match? @name "^get""##.to_string()]);
    }

    #[test]
    fn leaves_parens_inside_strings_alone() {
        let pattern = r#"((identifier) @id (#eq? @id "(#weird?)"))"#;
        let (stripped, predicates) = strip_predicates(pattern);
        assert_eq!(stripped, "((identifier) @id )");
        assert_eq!(predicates.len(), 1);
    }

    #[test]
    fn tokenizer_handles_captures_strings_and_words() {
        let tokens = tokenize(r#"#any-of? @name "a" b /c+/"#);
        assert_eq!(tokens.len(), 5);
        assert!(matches!(&tokens[1], PredicateToken::Capture(name) if name == "name"));
        assert_eq!(tokens[2].text(), "a");
        assert_eq!(tokens[3].text(), "b");
        assert_eq!(tokens[4].text(), "c+");
    }

    #[test]
    fn unknown_predicates_are_rejected() {
        assert!(parse_predicate("#frobnicate? @x").is_err());
        assert!(parse_predicate("#is? @x warm").is_err());
    }

    #[test]
    fn trailing_capture_detection() {
        assert_eq!(
            trailing_capture("(class_declaration name: (identifier) @name)"),
            None
        );
        assert_eq!(
            trailing_capture("(class_declaration) @decl"),
            Some("decl".to_string())
        );
    }
}
