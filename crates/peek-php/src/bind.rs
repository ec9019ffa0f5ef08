//! Finds the `->assign('name', $value)` call that binds a template variable.
use peek_core::cancel::CancelToken;
use peek_core::describe::BindingMatch;
use peek_core::visit::{WalkFlow, walk};
use tracing::trace;

use crate::ast::{Node, NodeKind, SourceTree};

/// Method name that binds a template variable.
pub const BINDING_METHOD: &str = "assign";

/// First binding of `variable` in source order, or `None` when there is none
/// or `token` fires mid-walk.
///
/// The receiver is not checked: any `->assign(...)` or `?->assign(...)` whose
/// first positional argument is a plain string equal to `variable` counts.
/// `Class::assign(...)` and `assign(...)` do not.
pub fn locate<'t>(
    tree: &'t SourceTree,
    variable: &str,
    token: &CancelToken,
) -> Option<BindingMatch<'t, Node>> {
    let mut found = None;
    let outcome = walk(&tree.root, token, |ctx, node| {
        let Some(bound) = bound_expression(node, variable) else {
            return WalkFlow::Continue;
        };
        let doc_comment = ctx
            .find_ancestor(Node::is_statement)
            .and_then(|stmt| stmt.doc_comment.as_deref())
            .or(node.doc_comment.as_deref());
        found = Some(BindingMatch {
            bound_expression: bound,
            call_site_line: node.line,
            doc_comment,
        });
        WalkFlow::Stop
    });

    trace!(
        variable,
        visited = outcome.visited(),
        cancelled = outcome.is_cancelled(),
        "locate"
    );
    if outcome.is_cancelled() {
        return None;
    }
    found
}

/// Second argument of a matching `assign` call.
fn bound_expression<'t>(node: &'t Node, variable: &str) -> Option<&'t Node> {
    let NodeKind::MemberCall { method, arguments, .. } = &node.kind else {
        return None;
    };
    if method.name() != Some(BINDING_METHOD) {
        return None;
    }

    let mut positional = arguments.iter().filter(|arg| is_positional(arg));
    let key = positional.next()?;
    let value = positional.next()?;
    (string_value(key)? == variable).then_some(value)
}

fn is_positional(arg: &Node) -> bool {
    match &arg.kind {
        NodeKind::Argument { name, spread, .. } => name.is_none() && !spread,
        _ => true,
    }
}

fn string_value(arg: &Node) -> Option<&str> {
    let expr = match &arg.kind {
        NodeKind::Argument { value, .. } => value.as_ref(),
        _ => arg,
    };
    match &expr.kind {
        NodeKind::StringLiteral { value } => Some(value),
        _ => None,
    }
}
