//! Smarty template side: pull a variable reference out of template text.
use std::sync::LazyLock;

use peek_core::VariablePath;
use peek_error::{Error, Result};
use regex::Regex;

/// `{$var...}` / `{var...}` or a bare `$var...` with access steps.
static VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\$?[\w\->\[\]\.\$]+\}|\$[\w\->\[\]\.]+").expect("variable pattern is valid")
});

/// Root name of Smarty's built-in variable, `$smarty.get`, `$smarty.const.X`, ...
pub const RESERVED_ROOT: &str = "smarty";

/// What a template expression refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRef {
    /// Assigned from PHP; resolvable.
    Variable(VariablePath),
    /// `$smarty.*`, carries the reference as written.
    Reserved(String),
}

/// First variable reference in `text`.
///
/// The bare `$var` form does not match right after a `{`; that case is
/// covered by the braced form.
pub fn extract_variable(text: &str) -> Option<&str> {
    VARIABLE_PATTERN
        .find_iter(text)
        .find(|m| !is_brace_prefixed(text, m.start(), m.as_str()))
        .map(|m| m.as_str())
}

/// Variable reference covering byte offset `column`, the way an editor picks
/// the word under the cursor.
pub fn variable_at(text: &str, column: usize) -> Option<&str> {
    VARIABLE_PATTERN
        .find_iter(text)
        .filter(|m| !is_brace_prefixed(text, m.start(), m.as_str()))
        .find(|m| m.start() <= column && column < m.end())
        .map(|m| m.as_str())
}

fn is_brace_prefixed(text: &str, start: usize, matched: &str) -> bool {
    matched.starts_with('$') && start > 0 && text.as_bytes()[start - 1] == b'{'
}

/// `{$user.name}` → `user.name`, `$user` → `user`.
pub fn normalize_variable_name(raw: &str) -> &str {
    let name = raw.trim();
    let name = name.strip_prefix('{').unwrap_or(name);
    let name = name.strip_suffix('}').unwrap_or(name);
    name.strip_prefix('$').unwrap_or(name)
}

pub fn is_reserved(name: &str) -> bool {
    match name.strip_prefix(RESERVED_ROOT) {
        Some("") => true,
        Some(rest) => rest.starts_with(['.', '[']) || rest.starts_with("->"),
        None => false,
    }
}

/// Turn a template expression (or a plain name) into a [`TemplateRef`].
///
/// With `column`, the reference under that byte offset is used; otherwise the
/// first reference in `text`, falling back to `text` itself.
pub fn parse_reference(text: &str, column: Option<usize>) -> Result<TemplateRef> {
    let raw = match column {
        Some(column) => variable_at(text, column).ok_or_else(|| {
            Error::invalid_argument(format!("no template variable at column {column}"))
                .with_context("text", text)
        })?,
        None => extract_variable(text).unwrap_or(text),
    };

    let name = normalize_variable_name(raw);
    if is_reserved(name) {
        let shown = if raw.starts_with('{') {
            raw.trim_start_matches('{').trim_end_matches('}')
        } else {
            raw
        };
        return Ok(TemplateRef::Reserved(display_reserved(shown)));
    }
    VariablePath::parse(name).map(TemplateRef::Variable)
}

fn display_reserved(raw: &str) -> String {
    if raw.starts_with('$') {
        raw.to_string()
    } else {
        format!("${raw}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_braced_and_bare_forms() {
        let html = "<p>{$user.name}</p>";
        assert_eq!(extract_variable(html), Some("{$user.name}"));
        let tag = "{if $items[0]->id}";
        assert_eq!(extract_variable(tag), Some("$items[0]->id"));
        assert_eq!(extract_variable("plain text"), None);
    }

    #[test]
    fn picks_reference_under_column() {
        let line = "{$a} and {$b.c}";
        assert_eq!(variable_at(line, 1), Some("{$a}"));
        assert_eq!(variable_at(line, 12), Some("{$b.c}"));
        assert_eq!(variable_at(line, 6), None);
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_variable_name("{$user.name}"), "user.name");
        assert_eq!(normalize_variable_name("$user"), "user");
        assert_eq!(normalize_variable_name("{user}"), "user");
        assert_eq!(normalize_variable_name("user"), "user");
    }

    #[test]
    fn smarty_root_is_reserved() {
        assert!(is_reserved("smarty.const.FOO"));
        assert!(is_reserved("smarty"));
        assert!(!is_reserved("smartyUser"));
        assert!(!is_reserved("user"));
    }

    #[test]
    fn parse_reference_splits_path() {
        let parsed = parse_reference("{$user->address.city}", None).unwrap();
        let TemplateRef::Variable(path) = parsed else {
            panic!("expected variable");
        };
        assert_eq!(path.root(), "user");
        assert_eq!(path.segments().len(), 2);

        assert_eq!(
            parse_reference("{$smarty.now}", None).unwrap(),
            TemplateRef::Reserved("$smarty.now".into())
        );
        assert!(parse_reference("{$a}", Some(40)).is_err());
    }
}
