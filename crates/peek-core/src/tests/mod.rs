//! Test-only fixtures shared by peek-core unit tests.
//!
//! - `LangSimple`: a line-based toy language implementing `LanguageTrait`
//! - helpers for writing candidate files and nudging their mtime


pub use simple_lang::LangSimple;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Write `content` under `dir` and return the full path.
pub fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Move the file's mtime forward so the cache sees it as changed, independent
/// of filesystem timestamp granularity.
pub fn bump_mtime(path: &Path, by: Duration) {
    let current = std::fs::metadata(path).unwrap().modified().unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(current + by).unwrap();
}
