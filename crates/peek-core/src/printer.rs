//! Turns a [`Resolution`] into hover text or JSON.
use std::fmt::{self, Write};

use peek_error::{Error, Result};
use serde_json::json;

use crate::describe::{Resolution, TypeDescription, TypeKind};
use crate::path::VariablePath;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrintFormat {
    /// Markdown suitable for an editor hover
    #[default]
    Markdown,
    /// Pretty-printed JSON, `{ "variable": ..., "resolution": ... }`
    Json,
}

impl fmt::Display for PrintFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintFormat::Markdown => write!(f, "markdown"),
            PrintFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for PrintFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(PrintFormat::Markdown),
            "json" => Ok(PrintFormat::Json),
            other => Err(format!("Unknown format: {other}. Use 'markdown' or 'json'")),
        }
    }
}

pub fn render(
    resolution: &Resolution,
    variable: &VariablePath,
    format: PrintFormat,
) -> Result<String> {
    match format {
        PrintFormat::Markdown => Ok(render_markdown(resolution, variable)),
        PrintFormat::Json => to_json(&json!({
            "variable": variable.to_string(),
            "resolution": resolution,
        })),
    }
}

/// Text for Smarty's own `$smarty.*` variables, which are never resolved.
pub fn render_reserved(reference: &str, format: PrintFormat) -> Result<String> {
    match format {
        PrintFormat::Markdown => Ok(format!(
            "**Reserved Variable: `{reference}`**\n\n\
             Accesses Smarty's reserved variables \
             (e.g., `$smarty.get`, `$smarty.const`, `$smarty.now`).\n\
             Refer to Smarty documentation for details.\n"
        )),
        PrintFormat::Json => to_json(&json!({
            "variable": reference,
            "resolution": { "status": "reserved" },
        })),
    }
}

fn to_json(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| Error::unexpected("failed to serialize resolution").set_source(err))
}

pub fn render_markdown(resolution: &Resolution, variable: &VariablePath) -> String {
    let mut out = String::new();
    match resolution {
        Resolution::Found(desc) => write_description(&mut out, variable, desc),
        Resolution::Unclassified(site) => {
            let _ = writeln!(out, "**Variable: `{variable}`**\n");
            let _ = writeln!(
                out,
                "*Type:* Unknown (assigned at `{}:{}`, value not classified)",
                site.file.display(),
                site.line
            );
            if let Some(doc) = site.doc_comment.as_deref() {
                write_doc(&mut out, doc);
            }
        }
        Resolution::NotFound => {
            let _ = writeln!(out, "**Variable: `{variable}`**\n");
            let _ = writeln!(out, "*Type:* Unknown (requires broader analysis)");
        }
        Resolution::SearchUnavailable => {
            let _ = writeln!(out, "**Variable: `{variable}`**\n");
            let _ = writeln!(out, "*Search unavailable:* no candidate files to analyze.");
        }
    }
    out
}

fn write_description(out: &mut String, variable: &VariablePath, desc: &TypeDescription) {
    if desc.is_entity {
        let _ = writeln!(out, "**Entity: `{variable}`**\n");
        let _ = writeln!(out, "*Class:* `{}`", desc.type_name);
    } else if desc.is_collection {
        let _ = writeln!(out, "**Collection: `{variable}`**\n");
        let _ = writeln!(out, "*Type:* `{}`", desc.type_name);
    } else if desc.kind == TypeKind::Unknown {
        let _ = writeln!(out, "**Variable: `{variable}`**\n");
        let name = &desc.type_name;
        let _ = writeln!(out, "*Type:* `{name}` (requires broader analysis)");
    } else {
        let _ = writeln!(out, "**Variable: `{variable}`**\n");
        let _ = writeln!(out, "*Type:* `{}`", desc.type_name);
    }

    if let Some(structure) = desc.structure.as_ref().filter(|s| !s.is_empty()) {
        out.push_str("\n```php\n");
        write_structure(out, structure, 1);
        out.push_str("```\n");
    }

    if let Some(doc) = desc.doc_comment.as_deref() {
        write_doc(out, doc);
    }

    if let Some(file) = &desc.source_file {
        out.push_str("\n---\n");
        match desc.source_line {
            Some(line) => {
                let _ = writeln!(out, "*Defined at* `{}:{}`", file.display(), line);
            }
            None => {
                let _ = writeln!(out, "*Defined in* `{}`", file.display());
            }
        }
    }
}

fn write_structure(
    out: &mut String,
    structure: &std::collections::BTreeMap<String, TypeDescription>,
    indent: usize,
) {
    let pad = "    ".repeat(indent - 1);
    let _ = writeln!(out, "{pad}array(");
    for (key, value) in structure {
        match value.structure.as_ref().filter(|s| !s.is_empty()) {
            Some(nested) => {
                let _ = write!(out, "{pad}    '{key}' => ");
                let mut inner = String::new();
                write_structure(&mut inner, nested, indent + 1);
                out.push_str(inner.trim_start());
            }
            None => {
                let _ = writeln!(out, "{pad}    '{key}' => {},", value.type_name);
            }
        }
    }
    if indent > 1 {
        let _ = writeln!(out, "{pad}),");
    } else {
        let _ = writeln!(out, "{pad})");
    }
}

fn write_doc(out: &mut String, doc: &str) {
    let cleaned = clean_doc_comment(doc);
    if !cleaned.is_empty() {
        out.push('\n');
        out.push_str(&cleaned);
        out.push('\n');
    }
}

/// Strip `/**`, `*/` and leading `*` gutters from a docblock.
pub fn clean_doc_comment(doc: &str) -> String {
    let body = doc.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);
    body.lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map(str::trim_start).unwrap_or(line)
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
