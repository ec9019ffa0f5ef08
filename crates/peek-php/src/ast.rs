//! Lowered PHP syntax tree.
//!
//! Only the shapes the locator and inferencer look at get their own variant.
//! Everything else lands in [`NodeKind::Other`] with its lowered children, so
//! a walk still reaches calls nested inside functions, classes, loops and the
//! like.

use peek_core::visit::{Children, Walkable};
use smallvec::SmallVec;

/// Immutable lowered tree of one PHP file.
#[derive(Debug, Clone)]
pub struct SourceTree {
    pub root: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// 1-based line where the node starts.
    pub line: u32,
    /// A `/** ... */` comment directly preceding this node.
    pub doc_comment: Option<String>,
}

/// Method or property name in an access expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Named(String),
    /// `$obj->$name`, `$obj->{expr}`
    Dynamic(Box<Node>),
}

impl Member {
    pub fn name(&self) -> Option<&str> {
        match self {
            Member::Named(name) => Some(name),
            Member::Dynamic(_) => None,
        }
    }
}

/// What follows `new`.
#[derive(Debug, Clone, PartialEq)]
pub enum NewTarget {
    /// `new Foo`, `new \App\Foo`; stored as written.
    Class(String),
    /// `new $class`, `new static`, `new (expr)`
    Dynamic(Box<Node>),
    /// `new class { ... }`, body kept for walking.
    Anonymous(Vec<Node>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStyle {
    /// `->`
    Instance,
    /// `?->`
    Nullsafe,
    /// `::`
    Scoped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program { statements: Vec<Node> },
    Block { statements: Vec<Node> },
    ExpressionStatement { expression: Box<Node> },
    Return { value: Option<Box<Node>> },
    Assignment { target: Box<Node>, value: Box<Node> },
    /// `$recv->name(...)` or `$recv?->name(...)`
    MemberCall {
        receiver: Box<Node>,
        method: Member,
        arguments: Vec<Node>,
        nullsafe: bool,
    },
    /// `Scope::name(...)`
    StaticCall {
        scope: Box<Node>,
        method: Member,
        arguments: Vec<Node>,
    },
    FunctionCall {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    Argument {
        /// Named argument label, `name: value`.
        name: Option<String>,
        spread: bool,
        value: Box<Node>,
    },
    New {
        target: NewTarget,
        arguments: Vec<Node>,
    },
    ArrayLiteral { elements: Vec<Node> },
    ArrayElement {
        key: Option<Box<Node>>,
        value: Box<Node>,
        spread: bool,
    },
    /// Quoted string, heredoc or nowdoc without interpolation. `value` is the
    /// unquoted text.
    StringLiteral { value: String },
    /// Double-quoted string or heredoc containing `$var` / `{$expr}` parts.
    InterpolatedString { parts: Vec<Node> },
    NumberLiteral { raw: String },
    BoolLiteral { value: bool },
    NullLiteral,
    /// Bare or qualified name as written, e.g. `PHP_EOL`, `\App\Foo`.
    Name { name: String },
    /// Without the leading `$`.
    Variable { name: String },
    /// Property or class-constant access.
    MemberAccess {
        object: Box<Node>,
        member: Member,
        style: AccessStyle,
    },
    Subscript {
        object: Box<Node>,
        index: Option<Box<Node>>,
    },
    /// `(int) $x`; `target` is the type inside the parens as written.
    Cast { target: String, value: Box<Node> },
    Other {
        kind: &'static str,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn new(kind: NodeKind, line: u32) -> Self {
        Self {
            kind,
            line,
            doc_comment: None,
        }
    }

    pub fn with_doc_comment(mut self, doc: Option<String>) -> Self {
        self.doc_comment = doc;
        self
    }

    /// Statement-level nodes, the ones a binding's doc comment is taken from.
    pub fn is_statement(&self) -> bool {
        match &self.kind {
            NodeKind::ExpressionStatement { .. } | NodeKind::Return { .. } => true,
            NodeKind::Other { kind, .. } => kind.ends_with("_statement"),
            _ => false,
        }
    }

    /// Short label for logs and test failures.
    pub fn label(&self) -> &'static str {
        match &self.kind {
            NodeKind::Program { .. } => "program",
            NodeKind::Block { .. } => "block",
            NodeKind::ExpressionStatement { .. } => "expression_statement",
            NodeKind::Return { .. } => "return",
            NodeKind::Assignment { .. } => "assignment",
            NodeKind::MemberCall { .. } => "member_call",
            NodeKind::StaticCall { .. } => "static_call",
            NodeKind::FunctionCall { .. } => "function_call",
            NodeKind::Argument { .. } => "argument",
            NodeKind::New { .. } => "new",
            NodeKind::ArrayLiteral { .. } => "array",
            NodeKind::ArrayElement { .. } => "array_element",
            NodeKind::StringLiteral { .. } => "string",
            NodeKind::InterpolatedString { .. } => "interpolated_string",
            NodeKind::NumberLiteral { .. } => "number",
            NodeKind::BoolLiteral { .. } => "bool",
            NodeKind::NullLiteral => "null",
            NodeKind::Name { .. } => "name",
            NodeKind::Variable { .. } => "variable",
            NodeKind::MemberAccess { .. } => "member_access",
            NodeKind::Subscript { .. } => "subscript",
            NodeKind::Cast { .. } => "cast",
            NodeKind::Other { kind, .. } => *kind,
        }
    }
}

impl Walkable for Node {
    fn children(&self) -> Children<'_, Self> {
        let mut out: Children<'_, Self> = SmallVec::new();
        match &self.kind {
            NodeKind::Program { statements } | NodeKind::Block { statements } => {
                out.extend(statements.iter());
            }
            NodeKind::ExpressionStatement { expression } => out.push(expression),
            NodeKind::Return { value } => out.extend(value.as_deref()),
            NodeKind::Assignment { target, value } => {
                out.push(target);
                out.push(value);
            }
            NodeKind::MemberCall {
                receiver,
                method,
                arguments,
                ..
            } => {
                out.push(receiver);
                push_member(&mut out, method);
                out.extend(arguments.iter());
            }
            NodeKind::StaticCall {
                scope,
                method,
                arguments,
            } => {
                out.push(scope);
                push_member(&mut out, method);
                out.extend(arguments.iter());
            }
            NodeKind::FunctionCall { callee, arguments } => {
                out.push(callee);
                out.extend(arguments.iter());
            }
            NodeKind::Argument { value, .. } => out.push(value),
            NodeKind::New { target, arguments } => {
                match target {
                    NewTarget::Class(_) => {}
                    NewTarget::Dynamic(expr) => out.push(expr),
                    NewTarget::Anonymous(body) => out.extend(body.iter()),
                }
                out.extend(arguments.iter());
            }
            NodeKind::ArrayLiteral { elements } => out.extend(elements.iter()),
            NodeKind::ArrayElement { key, value, .. } => {
                out.extend(key.as_deref());
                out.push(value);
            }
            NodeKind::InterpolatedString { parts } => out.extend(parts.iter()),
            NodeKind::MemberAccess { object, member, .. } => {
                out.push(object);
                push_member(&mut out, member);
            }
            NodeKind::Subscript { object, index } => {
                out.push(object);
                out.extend(index.as_deref());
            }
            NodeKind::Cast { value, .. } => out.push(value),
            NodeKind::Other { children, .. } => out.extend(children.iter()),
            NodeKind::StringLiteral { .. }
            | NodeKind::NumberLiteral { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::Name { .. }
            | NodeKind::Variable { .. } => {}
        }
        out
    }
}

fn push_member<'a>(out: &mut Children<'a, Node>, member: &'a Member) {
    if let Member::Dynamic(expr) = member {
        out.push(expr);
    }
}
