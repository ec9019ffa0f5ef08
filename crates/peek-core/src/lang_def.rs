//! The seam between the language-agnostic pipeline and a host-language frontend.
use std::path::Path;

use peek_error::Result;

use crate::cancel::CancelToken;
use crate::describe::{BindingMatch, TypeDescription};
use crate::option::ResolveOption;
use crate::visit::Walkable;

/// A host-language frontend: how to parse a file, find the binding call in it,
/// and classify the bound expression.
pub trait LanguageTrait {
    /// Parsed form of one source file. Immutable once built.
    type Tree: Send + Sync + 'static;
    /// Node type of [`Self::Tree`].
    type Node: Walkable;

    /// Short name used in logs.
    fn name() -> &'static str;

    /// File extensions (without the dot) that candidate discovery should pick up.
    fn supported_extensions() -> &'static [&'static str];

    /// Parse source text. Malformed input is an error, never a panic.
    fn parse(text: &[u8], path: &Path) -> Result<Self::Tree>;

    /// Find the first call binding `variable` in `tree`.
    ///
    /// Returns `None` when nothing matches or when `token` is cancelled.
    fn locate<'t>(
        tree: &'t Self::Tree,
        variable: &str,
        token: &CancelToken,
    ) -> Option<BindingMatch<'t, Self::Node>>;

    /// Classify an expression node. `None` means the shape is not recognized at
    /// all, which differs from being classified as unknown.
    fn infer(
        expression: &Self::Node,
        file: &Path,
        option: &ResolveOption,
    ) -> Option<TypeDescription>;
}
