//! Access paths on template variables: `user.address->city[0]`.
use std::fmt;

use peek_error::{Error, Result};

use crate::describe::TypeDescription;

/// One step after the root name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `.name` (Smarty array/object access) or `->name` (property access)
    Field(String),
    /// `[key]`; quotes around string keys are removed
    Index(String),
}

impl PathSegment {
    pub fn key(&self) -> &str {
        match self {
            PathSegment::Field(key) | PathSegment::Index(key) => key,
        }
    }
}

/// A normalized variable reference: a root name plus optional access steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePath {
    root: String,
    segments: Vec<PathSegment>,
}

impl VariablePath {
    /// Parse a normalized reference (delimiters and `$` already stripped).
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let root_end = text
            .find(|c: char| c == '.' || c == '[' || c == '-')
            .unwrap_or(text.len());
        let root = &text[..root_end];
        if root.is_empty() || !root.chars().all(is_name_char) {
            return Err(Error::invalid_argument(format!(
                "'{text}' does not start with a variable name"
            )));
        }

        let mut segments = Vec::new();
        let mut rest = &text[root_end..];
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("->") {
                let (name, tail) = split_name(after);
                segments.push(PathSegment::Field(name.to_string()));
                rest = tail;
            } else if let Some(after) = rest.strip_prefix('.') {
                let (name, tail) = split_name(after);
                segments.push(PathSegment::Field(name.to_string()));
                rest = tail;
            } else if let Some(after) = rest.strip_prefix('[') {
                let Some(close) = after.find(']') else {
                    return Err(Error::invalid_argument(format!("unclosed `[` in '{text}'")));
                };
                let key = after[..close].trim();
                let key = key.trim_matches(['\'', '"']);
                segments.push(PathSegment::Index(key.to_string()));
                rest = &after[close + 1..];
            } else {
                return Err(Error::invalid_argument(format!(
                    "unexpected '{rest}' in variable reference '{text}'"
                )));
            }

            if matches!(segments.last(), Some(PathSegment::Field(name)) if name.is_empty()) {
                return Err(Error::invalid_argument(format!("empty field name in '{text}'")));
            }
        }

        Ok(Self {
            root: root.to_string(),
            segments,
        })
    }

    /// Path consisting of a bare name.
    pub fn root_only(name: impl Into<String>) -> Self {
        Self {
            root: name.into(),
            segments: Vec::new(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Follow the access steps through `desc.structure`.
    ///
    /// A step the structure does not know yields an unknown `mixed` value that
    /// keeps the provenance of the last known level.
    pub fn project(&self, desc: TypeDescription) -> TypeDescription {
        let mut current = desc;
        for segment in &self.segments {
            match current.field(segment.key()) {
                Some(next) => {
                    let mut next = next.clone();
                    if next.source_file.is_none() {
                        next.source_file = current.source_file.clone();
                    }
                    current = next;
                }
                None => {
                    return TypeDescription::mixed()
                        .with_source(current.source_file.clone(), current.source_line)
                        .with_doc_comment(current.doc_comment.clone());
                }
            }
        }
        current
    }
}

impl fmt::Display for VariablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn split_name(text: &str) -> (&str, &str) {
    let end = text.find(|c: char| !is_name_char(c)).unwrap_or(text.len());
    text.split_at(end)
}
