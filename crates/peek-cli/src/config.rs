//! Optional `.smarty-peek.toml` project configuration.
use std::path::{Path, PathBuf};

use peek_error::{Error, Result};
use serde::Deserialize;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = ".smarty-peek.toml";

/// ```toml
/// roots = ["app/Controllers", "lib"]
/// skip_dirs = ["legacy"]
/// extensions = ["php", "inc", "phtml"]
/// max_infer_depth = 4
/// ```
///
/// Relative `roots` are taken relative to the config file's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeekConfig {
    pub roots: Vec<PathBuf>,
    pub skip_dirs: Vec<String>,
    pub extensions: Vec<String>,
    pub max_infer_depth: Option<usize>,
}

impl PeekConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            Error::from(err)
                .with_operation("config::load")
                .with_path(path)
        })?;
        let mut config = Self::from_toml(&text).map_err(|err| err.with_path(path))?;

        if let Some(base) = path.parent() {
            config.roots = config
                .roots
                .into_iter()
                .map(|root| {
                    if root.is_relative() {
                        base.join(root)
                    } else {
                        root
                    }
                })
                .collect();
        }
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| {
            Error::config_invalid(format!("invalid {CONFIG_FILE_NAME}: {}", err.message()))
                .with_operation("config::parse")
                .set_source(err)
        })
    }

    /// Load `path` if given (it must exist), else `<dir>/.smarty-peek.toml`
    /// if present, else defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }
}
