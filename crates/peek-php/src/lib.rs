//! PHP support for smarty-peek.
//!
//! Parses controller code with tree-sitter-php, lowers it into [`ast::Node`],
//! and answers "what does `$smarty->assign('x', ...)` bind `x` to".
use std::path::Path;

use peek_core::cancel::CancelToken;
use peek_core::describe::{BindingMatch, TypeDescription};
use peek_core::lang_def::LanguageTrait;
use peek_core::option::ResolveOption;
use peek_error::Result;

pub mod ast;
pub mod bind;
pub mod infer;
pub mod parse;

pub use ast::{AccessStyle, Member, NewTarget, Node, NodeKind, SourceTree};
pub use bind::BINDING_METHOD;
pub use infer::normalize_cast;

/// Resolver and cache for PHP candidates.
pub type PhpResolver<'c> = peek_core::Resolver<'c, LangPhp>;
pub type PhpCache = peek_core::SourceCache<LangPhp>;

pub struct LangPhp;

impl LangPhp {
    pub const SUPPORTED_EXTENSIONS: &'static [&'static str] = &["php", "inc"];
}

impl LanguageTrait for LangPhp {
    type Tree = SourceTree;
    type Node = Node;

    fn name() -> &'static str {
        "php"
    }

    fn supported_extensions() -> &'static [&'static str] {
        Self::SUPPORTED_EXTENSIONS
    }

    fn parse(text: &[u8], path: &Path) -> Result<Self::Tree> {
        parse::parse_source(text, path)
    }

    fn locate<'t>(
        tree: &'t Self::Tree,
        variable: &str,
        token: &CancelToken,
    ) -> Option<BindingMatch<'t, Self::Node>> {
        bind::locate(tree, variable, token)
    }

    fn infer(
        expression: &Self::Node,
        file: &Path,
        option: &ResolveOption,
    ) -> Option<TypeDescription> {
        infer::infer(expression, file, option)
    }
}
