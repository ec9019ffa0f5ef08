//! Type descriptions produced by the inferencer.
use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, IntoStaticStr};

/// Coarse classification of a bound expression.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    LiteralPrimitive,
    Array,
    Entity,
    MemberAccess,
    CallResult,
    Unknown,
}

/// Probable type of a template variable plus where that guess comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescription {
    pub kind: TypeKind,
    pub type_name: String,
    pub is_entity: bool,
    pub is_collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    /// 1-based. Points at the binding call once the resolver has applied it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<BTreeMap<String, TypeDescription>>,
}

impl TypeDescription {
    pub fn new(kind: TypeKind, type_name: impl Into<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            is_entity: false,
            is_collection: false,
            source_file: None,
            source_line: None,
            doc_comment: None,
            structure: None,
        }
    }

    pub fn primitive(type_name: impl Into<String>) -> Self {
        Self::new(TypeKind::LiteralPrimitive, type_name)
    }

    pub fn array() -> Self {
        let mut desc = Self::new(TypeKind::Array, "array");
        desc.is_collection = true;
        desc
    }

    pub fn entity(class_name: impl Into<String>) -> Self {
        let mut desc = Self::new(TypeKind::Entity, class_name);
        desc.is_entity = true;
        desc
    }

    /// Placeholder for values that need dataflow or return-type analysis.
    pub fn mixed() -> Self {
        Self::new(TypeKind::Unknown, "mixed")
    }

    pub fn with_source(mut self, file: Option<PathBuf>, line: Option<u32>) -> Self {
        self.source_file = file;
        self.source_line = line.filter(|line| *line > 0);
        self
    }

    pub fn with_doc_comment(mut self, doc: Option<String>) -> Self {
        self.doc_comment = doc;
        self
    }

    pub fn with_structure(mut self, structure: BTreeMap<String, TypeDescription>) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn field(&self, name: &str) -> Option<&TypeDescription> {
        self.structure.as_ref().and_then(|map| map.get(name))
    }

    /// Let the binding call site override the expression's own provenance.
    ///
    /// The call line always wins; the call's doc comment wins when present.
    pub fn apply_binding_site(
        mut self,
        file: PathBuf,
        call_line: u32,
        doc: Option<String>,
    ) -> Self {
        self.source_file = Some(file);
        if call_line > 0 {
            self.source_line = Some(call_line);
        }
        if doc.is_some() {
            self.doc_comment = doc;
        }
        self
    }
}

/// Transient result of the binding locator: the `assign` call that binds a name.
#[derive(Debug, Clone, Copy)]
pub struct BindingMatch<'t, N> {
    pub bound_expression: &'t N,
    pub call_site_line: u32,
    pub doc_comment: Option<&'t str>,
}

/// Where a binding was found, kept when its value could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSite {
    pub file: PathBuf,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
}

/// Outcome of one resolve query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "kebab-case")]
pub enum Resolution {
    /// A binding matched and its value was classified.
    Found(TypeDescription),
    /// A binding matched but the value's shape is not one the inferencer knows.
    Unclassified(BindingSite),
    /// Every candidate was searched (or the search was cancelled) without a match.
    NotFound,
    /// There was nothing to search, e.g. an empty candidate list.
    SearchUnavailable,
}

impl Resolution {
    pub fn description(&self) -> Option<&TypeDescription> {
        match self {
            Resolution::Found(desc) => Some(desc),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}
