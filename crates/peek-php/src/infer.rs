use std::collections::BTreeMap;
use std::path::Path;

use peek_core::describe::{TypeDescription, TypeKind};
use peek_core::option::ResolveOption;

use crate::ast::{NewTarget, Node, NodeKind};

/// Classify the value bound to a template variable.
///
/// Returns `None` for shapes that are not classified at all (closures, match
/// expressions, arithmetic and so on).
#[tracing::instrument(skip_all, fields(kind = expression.label()))]
pub fn infer(expression: &Node, file: &Path, option: &ResolveOption) -> Option<TypeDescription> {
    infer_at(expression, file, option.max_infer_depth, 0)
}

fn infer_at(node: &Node, file: &Path, max_depth: usize, depth: usize) -> Option<TypeDescription> {
    let (expr, wrapper_doc) = unwrap_argument(node);
    let desc = classify(expr, file, max_depth, depth)?;
    let doc = expr
        .doc_comment
        .clone()
        .or_else(|| wrapper_doc.map(str::to_string));
    let desc = desc.with_source(Some(file.to_path_buf()), Some(expr.line));
    Some(desc.with_doc_comment(doc))
}

/// Arguments are transparent; a doc comment on the argument itself still counts.
fn unwrap_argument(node: &Node) -> (&Node, Option<&str>) {
    match &node.kind {
        NodeKind::Argument { value, .. } => (value.as_ref(), node.doc_comment.as_deref()),
        _ => (node, None),
    }
}

fn classify(node: &Node, file: &Path, max_depth: usize, depth: usize) -> Option<TypeDescription> {
    let desc = match &node.kind {
        NodeKind::StringLiteral { .. } | NodeKind::InterpolatedString { .. } => {
            TypeDescription::primitive("string")
        }
        NodeKind::NumberLiteral { raw } => {
            TypeDescription::primitive(if raw.contains('.') { "float" } else { "int" })
        }
        NodeKind::BoolLiteral { .. } => TypeDescription::primitive("bool"),
        NodeKind::NullLiteral => TypeDescription::primitive("null"),
        NodeKind::ArrayLiteral { elements } => {
            let desc = TypeDescription::array();
            match array_structure(elements, file, max_depth, depth) {
                Some(structure) => desc.with_structure(structure),
                None => desc,
            }
        }
        NodeKind::New { target, .. } => match target {
            NewTarget::Class(name) => TypeDescription::entity(name.trim_start_matches('\\')),
            NewTarget::Dynamic(_) | NewTarget::Anonymous(_) => TypeDescription::entity("object"),
        },
        NodeKind::Name { name } => TypeDescription::primitive(name.as_str()),
        NodeKind::Variable { .. }
        | NodeKind::MemberAccess { .. }
        | NodeKind::Subscript { .. }
        | NodeKind::MemberCall { .. }
        | NodeKind::StaticCall { .. }
        | NodeKind::FunctionCall { .. } => TypeDescription::mixed(),
        NodeKind::Cast { target, .. } => cast_description(target),
        _ => return None,
    };
    Some(desc)
}

/// String-keyed entries of an array literal, each inferred on its own.
fn array_structure(
    elements: &[Node],
    file: &Path,
    max_depth: usize,
    depth: usize,
) -> Option<BTreeMap<String, TypeDescription>> {
    if depth >= max_depth {
        return None;
    }

    let mut structure = BTreeMap::new();
    for element in elements {
        let NodeKind::ArrayElement {
            key: Some(key),
            value,
            spread: false,
        } = &element.kind
        else {
            continue;
        };
        let NodeKind::StringLiteral { value: key } = &key.kind else {
            continue;
        };
        if let Some(desc) = infer_at(value, file, max_depth, depth + 1) {
            let desc = match (&desc.doc_comment, &element.doc_comment) {
                (None, Some(doc)) => desc.with_doc_comment(Some(doc.clone())),
                _ => desc,
            };
            structure.insert(key.clone(), desc);
        }
    }
    (!structure.is_empty()).then_some(structure)
}

fn cast_description(target: &str) -> TypeDescription {
    let target = normalize_cast(target);
    match target.as_str() {
        "array" => TypeDescription::array(),
        "object" => TypeDescription::entity("object"),
        _ => TypeDescription::new(TypeKind::LiteralPrimitive, target),
    }
}

/// Canonical name for a cast target: `(integer)` is `int`, `(real)` is `float`.
pub fn normalize_cast(target: &str) -> String {
    let target = target.trim().to_ascii_lowercase();
    match target.as_str() {
        "integer" => "int".into(),
        "boolean" => "bool".into(),
        "double" | "real" => "float".into(),
        "binary" => "string".into(),
        "unset" => "null".into(),
        _ => target,
    }
}
