//! tree-sitter-php front end: parse, reject broken input, lower into [`Node`].
use std::cell::RefCell;
use std::path::Path;

use peek_error::{Error, Result};
use tracing::trace;
use tree_sitter::{Node as TsNode, Parser};

use crate::ast::{AccessStyle, Member, NewTarget, Node, NodeKind, SourceTree};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_BY: usize = 2 * 1024 * 1024;

/// Parse PHP source into a lowered [`SourceTree`].
///
/// Any `ERROR` or `MISSING` node in the concrete tree fails the whole file
/// with the first offending line.
pub fn parse_source(bytes: &[u8], path: &Path) -> Result<SourceTree> {
    let text = std::str::from_utf8(bytes).map_err(|err| {
        let line = line_of_offset(bytes, err.valid_up_to());
        Error::encoding_error("source is not valid UTF-8")
            .with_line(line)
            .set_source(err)
    })?;

    let tree = parse_tree(text)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(first_syntax_error(root, text));
    }

    let lowering = Lowering { text };
    let root = lowering.lower(root);
    trace!(path = %path.display(), "lowered php tree");
    Ok(SourceTree { root })
}

fn parse_tree(text: &str) -> Result<tree_sitter::Tree> {
    thread_local! {
        static PARSER: RefCell<Parser> = RefCell::new(Parser::new());
    }

    PARSER.with(|parser| {
        let mut parser = parser.borrow_mut();
        if parser.language().is_none() {
            parser
                .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
                .map_err(|err| {
                    Error::grammar_error("failed to load the PHP grammar").set_source(err)
                })?;
        }
        parser
            .parse(text, None)
            .ok_or_else(|| Error::parse_failed("parser produced no tree"))
    })
}

fn line_of_offset(bytes: &[u8], offset: usize) -> u32 {
    let end = offset.min(bytes.len());
    bytes[..end].iter().filter(|b| **b == b'\n').count() as u32 + 1
}

fn line_of(node: TsNode<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// Locate the first `ERROR` or `MISSING` node in document order.
fn first_syntax_error(root: TsNode<'_>, text: &str) -> Error {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            return Error::syntax_error_at(format!("missing `{}`", node.kind()), line_of(node));
        }
        if node.is_error() {
            let snippet = text
                .get(node.byte_range())
                .and_then(|s| s.lines().map(str::trim).find(|l| !l.is_empty()))
                .map(|s| s.chars().take(32).collect::<String>());
            let message = match snippet {
                Some(snippet) => format!("unexpected `{snippet}`"),
                None => "unexpected end of input".to_string(),
            };
            return Error::syntax_error_at(message, line_of(node));
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    Error::syntax_error_at("syntax error", line_of(root))
}

fn is_doc_comment(text: &str) -> bool {
    text.starts_with("/**") && text != "/**/"
}

struct Lowering<'s> {
    text: &'s str,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: TsNode<'_>) -> &'s str {
        self.text.get(node.byte_range()).unwrap_or("")
    }

    fn lower(&self, node: TsNode<'_>) -> Node {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_BY, || self.lower_inner(node))
    }

    fn lower_inner(&self, node: TsNode<'_>) -> Node {
        let line = line_of(node);
        let kind = match node.kind() {
            "program" => NodeKind::Program {
                statements: self.lower_list(node),
            },
            "compound_statement" => NodeKind::Block {
                statements: self.lower_list(node),
            },
            "expression_statement" => match first_named(node) {
                Some(expr) => NodeKind::ExpressionStatement {
                    expression: Box::new(self.lower(expr)),
                },
                None => self.other(node),
            },
            "return_statement" => NodeKind::Return {
                value: first_named(node).map(|expr| Box::new(self.lower(expr))),
            },
            "assignment_expression" | "reference_assignment_expression" => {
                match field_pair(node, "left", "right") {
                    Some((left, right)) => NodeKind::Assignment {
                        target: Box::new(self.lower(left)),
                        value: Box::new(self.lower(right)),
                    },
                    None => self.other(node),
                }
            }
            "parenthesized_expression" => {
                return match first_named(node) {
                    Some(inner) => self.lower(inner),
                    None => Node::new(self.other(node), line),
                };
            }
            "member_call_expression" | "nullsafe_member_call_expression" => {
                match field_pair(node, "object", "name") {
                    Some((object, name)) => NodeKind::MemberCall {
                        receiver: Box::new(self.lower(object)),
                        method: self.member(name),
                        arguments: self.arguments(node),
                        nullsafe: node.kind() == "nullsafe_member_call_expression",
                    },
                    None => self.other(node),
                }
            }
            "scoped_call_expression" => match field_pair(node, "scope", "name") {
                Some((scope, name)) => NodeKind::StaticCall {
                    scope: Box::new(self.lower(scope)),
                    method: self.member(name),
                    arguments: self.arguments(node),
                },
                None => self.other(node),
            },
            "function_call_expression" => match node.child_by_field_name("function") {
                Some(function) => NodeKind::FunctionCall {
                    callee: Box::new(self.lower(function)),
                    arguments: self.arguments(node),
                },
                None => self.other(node),
            },
            "argument" => self.argument(node),
            "object_creation_expression" => self.object_creation(node),
            "array_creation_expression" => NodeKind::ArrayLiteral {
                elements: self.lower_list(node),
            },
            "array_element_initializer" => self.array_element(node),
            "string" => NodeKind::StringLiteral {
                value: unquote_single(self.text(node)),
            },
            "encapsed_string" | "heredoc" => self.double_quoted(node),
            "nowdoc" => NodeKind::StringLiteral {
                value: self.body_text(node, "nowdoc_body"),
            },
            "integer" | "float" => NodeKind::NumberLiteral {
                raw: self.text(node).to_string(),
            },
            "unary_op_expression" => match self.signed_number(node) {
                Some(raw) => NodeKind::NumberLiteral { raw },
                None => self.other(node),
            },
            "boolean" => NodeKind::BoolLiteral {
                value: self.text(node).eq_ignore_ascii_case("true"),
            },
            "null" => NodeKind::NullLiteral,
            "name" | "qualified_name" | "relative_scope" => NodeKind::Name {
                name: self.text(node).to_string(),
            },
            "variable_name" => NodeKind::Variable {
                name: self.text(node).trim_start_matches('$').to_string(),
            },
            "member_access_expression" | "nullsafe_member_access_expression" => {
                match field_pair(node, "object", "name") {
                    Some((object, name)) => NodeKind::MemberAccess {
                        object: Box::new(self.lower(object)),
                        member: self.member(name),
                        style: if node.kind() == "nullsafe_member_access_expression" {
                            AccessStyle::Nullsafe
                        } else {
                            AccessStyle::Instance
                        },
                    },
                    None => self.other(node),
                }
            }
            "scoped_property_access_expression" | "class_constant_access_expression" => {
                let named = named_children(node);
                let scope = node.child_by_field_name("scope");
                let scope = scope.or_else(|| named.first().copied());
                let name = node.child_by_field_name("name");
                let name = name.or_else(|| named.get(1).copied());
                match (scope, name) {
                    (Some(scope), Some(name)) => NodeKind::MemberAccess {
                        object: Box::new(self.lower(scope)),
                        member: self.member(name),
                        style: AccessStyle::Scoped,
                    },
                    _ => self.other(node),
                }
            }
            "subscript_expression" => {
                let named = self.non_comment_children(node);
                match named.split_first() {
                    Some((object, rest)) => NodeKind::Subscript {
                        object: Box::new(self.lower(*object)),
                        index: rest.first().map(|index| Box::new(self.lower(*index))),
                    },
                    None => self.other(node),
                }
            }
            "cast_expression" => match field_pair(node, "type", "value") {
                Some((ty, value)) => NodeKind::Cast {
                    target: self.text(ty).trim().to_string(),
                    value: Box::new(self.lower(value)),
                },
                None => self.other(node),
            },
            _ => self.other(node),
        };
        Node::new(kind, line)
    }

    /// `-1`, `+4.2`: a sign applied directly to a number literal.
    fn signed_number(&self, node: TsNode<'_>) -> Option<String> {
        let operand = node
            .child_by_field_name("argument")
            .or_else(|| first_named(node))?;
        if !matches!(operand.kind(), "integer" | "float") {
            return None;
        }
        let sign = match self.text(node).trim_start().chars().next()? {
            '-' => "-",
            '+' => "+",
            _ => return None,
        };
        Some(format!("{sign}{}", self.text(operand)))
    }

    fn other(&self, node: TsNode<'_>) -> NodeKind {
        NodeKind::Other {
            kind: node.kind(),
            children: self.lower_list(node),
        }
    }

    /// Lower named children in order, attaching each doc comment to the next
    /// sibling. A plain comment in between discards a pending doc comment.
    fn lower_list(&self, node: TsNode<'_>) -> Vec<Node> {
        let mut out = Vec::new();
        let mut pending: Option<String> = None;
        for child in named_children(node) {
            if child.kind() == "comment" {
                let text = self.text(child);
                pending = is_doc_comment(text).then(|| text.to_string());
                continue;
            }
            let lowered = self.lower(child);
            let doc = pending.take().or_else(|| lowered.doc_comment.clone());
            out.push(lowered.with_doc_comment(doc));
        }
        out
    }

    fn non_comment_children<'t>(&self, node: TsNode<'t>) -> Vec<TsNode<'t>> {
        named_children(node)
            .into_iter()
            .filter(|child| child.kind() != "comment")
            .collect()
    }

    fn arguments(&self, call: TsNode<'_>) -> Vec<Node> {
        call.child_by_field_name("arguments")
            .map(|args| self.lower_list(args))
            .unwrap_or_default()
    }

    fn member(&self, name: TsNode<'_>) -> Member {
        match name.kind() {
            "name" => Member::Named(self.text(name).to_string()),
            _ => Member::Dynamic(Box::new(self.lower(name))),
        }
    }

    fn argument(&self, node: TsNode<'_>) -> NodeKind {
        let label = node.child_by_field_name("name");
        let name = label.map(|label| self.text(label).to_string());
        let mut values = self
            .non_comment_children(node)
            .into_iter()
            .filter(|child| Some(*child) != label && child.kind() != "reference_modifier");

        match values.next() {
            Some(value) if value.kind() == "variadic_unpacking" => match first_named(value) {
                Some(inner) => NodeKind::Argument {
                    name,
                    spread: true,
                    value: Box::new(self.lower(inner)),
                },
                None => self.other(node),
            },
            Some(value) => NodeKind::Argument {
                name,
                spread: self.text(node).trim_start().starts_with("..."),
                value: Box::new(self.lower(value)),
            },
            None => self.other(node),
        }
    }

    fn object_creation(&self, node: TsNode<'_>) -> NodeKind {
        let arguments = self.arguments_child(node);
        let named = self.non_comment_children(node);

        if let Some(anon) = child_of_kind(&named, "anonymous_class") {
            return NodeKind::New {
                target: NewTarget::Anonymous(self.lower_list(anon)),
                arguments,
            };
        }
        if child_of_kind(&named, "declaration_list").is_some() {
            let body = named
                .iter()
                .filter(|child| child.kind() != "arguments")
                .map(|child| self.lower(*child))
                .collect();
            return NodeKind::New {
                target: NewTarget::Anonymous(body),
                arguments,
            };
        }

        match named.iter().find(|child| child.kind() != "arguments") {
            Some(class) if matches!(class.kind(), "name" | "qualified_name") => NodeKind::New {
                target: NewTarget::Class(self.text(*class).to_string()),
                arguments,
            },
            Some(class) => NodeKind::New {
                target: NewTarget::Dynamic(Box::new(self.lower(*class))),
                arguments,
            },
            None => self.other(node),
        }
    }

    fn arguments_child(&self, node: TsNode<'_>) -> Vec<Node> {
        let named = named_children(node);
        child_of_kind(&named, "arguments")
            .map(|args| self.lower_list(args))
            .unwrap_or_default()
    }

    fn array_element(&self, node: TsNode<'_>) -> NodeKind {
        let named = self.non_comment_children(node);
        match named.as_slice() {
            [value] if value.kind() == "variadic_unpacking" => match first_named(*value) {
                Some(inner) => NodeKind::ArrayElement {
                    key: None,
                    value: Box::new(self.lower(inner)),
                    spread: true,
                },
                None => self.other(node),
            },
            [value] => NodeKind::ArrayElement {
                key: None,
                value: Box::new(self.lower(*value)),
                spread: false,
            },
            [key, value, ..] => NodeKind::ArrayElement {
                key: Some(Box::new(self.lower(*key))),
                value: Box::new(self.lower(*value)),
                spread: false,
            },
            [] => self.other(node),
        }
    }

    fn double_quoted(&self, node: TsNode<'_>) -> NodeKind {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut stack: Vec<_> = named_children(node).into_iter().rev().collect();

        while let Some(current) = stack.pop() {
            match current.kind() {
                "string_content" | "string_value" | "string" => {
                    literal.push_str(self.text(current))
                }
                "escape_sequence" => literal.push_str(&unescape(self.text(current))),
                "heredoc_start" | "heredoc_end" => {}
                "heredoc_body" => stack.extend(named_children(current).into_iter().rev()),
                _ => parts.push(self.lower(current)),
            }
        }

        if parts.is_empty() {
            NodeKind::StringLiteral {
                value: literal_or_unquoted(literal, self.text(node)),
            }
        } else {
            NodeKind::InterpolatedString { parts }
        }
    }

    fn body_text(&self, node: TsNode<'_>, body_kind: &str) -> String {
        let named = named_children(node);
        child_of_kind(&named, body_kind)
            .map(|body| self.text(body).to_string())
            .unwrap_or_default()
    }
}

/// Both named fields of `node`, if present.
fn field_pair<'t>(
    node: TsNode<'t>,
    first: &str,
    second: &str,
) -> Option<(TsNode<'t>, TsNode<'t>)> {
    let first = node.child_by_field_name(first)?;
    let second = node.child_by_field_name(second)?;
    Some((first, second))
}

fn child_of_kind<'t>(nodes: &[TsNode<'t>], kind: &str) -> Option<TsNode<'t>> {
    nodes.iter().find(|child| child.kind() == kind).copied()
}

fn named_children(node: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn first_named(node: TsNode<'_>) -> Option<TsNode<'_>> {
    named_children(node)
        .into_iter()
        .find(|child| child.kind() != "comment")
}

fn unquote_single(raw: &str) -> String {
    let raw = raw.strip_prefix(['b', 'B']).unwrap_or(raw);
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw);
    inner.replace("\\'", "'").replace("\\\\", "\\")
}

/// Fallback for grammars that do not expose string content nodes.
fn literal_or_unquoted(literal: String, raw: &str) -> String {
    if !literal.is_empty() {
        return literal;
    }
    let raw = raw.strip_prefix(['b', 'B']).unwrap_or(raw);
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(str::to_string)
        .unwrap_or_default()
}

fn unescape(seq: &str) -> String {
    match seq {
        "\\n" => "\n".into(),
        "\\t" => "\t".into(),
        "\\r" => "\r".into(),
        "\\\\" => "\\".into(),
        "\\$" => "$".into(),
        "\\\"" => "\"".into(),
        other => other.to_string(),
    }
}
