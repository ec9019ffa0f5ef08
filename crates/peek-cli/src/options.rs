//! Command-line option groups shared by the binary and its tests.

use std::path::PathBuf;

use clap::Args;
use peek_core::PrintFormat;

/// Where to look for PHP code.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchOptions {
    /// Directories to scan recursively (repeatable)
    #[arg(
        short = 'd',
        long = "dir",
        value_name = "DIR",
        action = clap::ArgAction::Append
    )]
    pub dirs: Vec<PathBuf>,

    /// Candidate files searched before any directory (repeatable)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        action = clap::ArgAction::Append
    )]
    pub files: Vec<PathBuf>,

    /// Config file; defaults to .smarty-peek.toml in the first directory or the
    /// working directory
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// How deep to infer and how to print the answer.
#[derive(Args, Debug, Clone)]
pub struct OutputOptions {
    /// Output format: 'markdown' (or 'md') or 'json'
    #[arg(long, value_name = "FORMAT", default_value = "markdown")]
    pub format: PrintFormat,

    /// How many levels of keyed array literals to expand
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: PrintFormat::Markdown,
            max_depth: None,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.files.push(file.into());
        self
    }

    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }
}

impl OutputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: PrintFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}
