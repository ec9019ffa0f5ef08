//! smarty-peek command-line interface.

pub mod config;
pub mod discovery;
pub mod options;
pub mod template;

use std::path::PathBuf;

use tracing::info;

use peek_core::{CancelToken, LanguageTrait, ResolveOption, render, render_reserved};
use peek_error::Result;
use peek_php::{LangPhp, PhpCache, PhpResolver};

pub use config::PeekConfig;
pub use discovery::{DiscoveryOptions, discover_candidates};
pub use options::{OutputOptions, SearchOptions};
pub use template::TemplateRef;

/// One query: which template expression, where to search, how to print.
#[derive(Debug, Clone)]
pub struct PeekOptions {
    /// Template text or bare variable path, e.g. `{$user.name}` or `user`.
    pub expression: String,
    /// Byte offset in `expression` to pick the reference under.
    pub column: Option<usize>,
    pub search: SearchOptions,
    pub output: OutputOptions,
}

impl PeekOptions {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            column: None,
            search: SearchOptions::default(),
            output: OutputOptions::default(),
        }
    }

    pub fn with_search(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

/// Resolve the expression and return the rendered answer.
pub fn run_main(opts: &PeekOptions) -> Result<String> {
    let variable = match template::parse_reference(&opts.expression, opts.column)? {
        TemplateRef::Reserved(reference) => {
            info!(%reference, "reserved variable, not resolved");
            return render_reserved(&reference, opts.output.format);
        }
        TemplateRef::Variable(variable) => variable,
    };

    let config_dir = match opts.search.dirs.first() {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let config = PeekConfig::discover(opts.search.config.as_deref(), &config_dir)?;

    let mut option = ResolveOption::new();
    if let Some(depth) = opts.output.max_depth.or(config.max_infer_depth) {
        option = option.with_max_infer_depth(depth);
    }
    if !config.extensions.is_empty() {
        option = option.with_extensions(Some(config.extensions.clone()));
    }

    let mut dirs: Vec<PathBuf> = opts.search.dirs.clone();
    if dirs.is_empty() && opts.search.files.is_empty() {
        dirs = config.roots.clone();
    }
    let discovery = DiscoveryOptions {
        dirs,
        files: opts.search.files.clone(),
        skip_dirs: config.skip_dirs.clone(),
        extensions: option
            .extensions_or(LangPhp::supported_extensions())
            .into_iter()
            .map(str::to_string)
            .collect(),
    };
    let candidates = discover_candidates(&discovery)?;

    let cache = PhpCache::new();
    let resolver = PhpResolver::new(&cache).with_option(option);
    let resolution = resolver.resolve(&variable, &candidates, &CancelToken::new());
    let metrics = cache.metrics();
    info!(
        parses = metrics.parses,
        failures = metrics.failures,
        found = resolution.is_found(),
        "resolution complete"
    );
    cache.clear();

    render(&resolution, &variable, opts.output.format)
}
