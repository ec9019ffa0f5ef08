use std::path::{Path, PathBuf};

use peek_core::{CancelToken, Resolution, ResolveOption, TypeDescription, VariablePath};
use peek_php::{PhpCache, PhpResolver};
use tracing_subscriber::EnvFilter;

#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn write_php(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("<?php\n{body}")).unwrap();
    path
}

/// Resolve `expr` against a single PHP snippet; the snippet starts on line 2.
#[allow(dead_code)]
pub fn resolve_snippet(body: &str, expr: &str) -> Resolution {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let file = write_php(dir.path(), "Controller.php", body);
    let cache = PhpCache::new();
    let variable = VariablePath::parse(expr).unwrap();
    PhpResolver::new(&cache)
        .with_option(ResolveOption::default())
        .resolve(&variable, &[file], &CancelToken::new())
}

#[allow(dead_code)]
pub fn describe_snippet(body: &str, expr: &str) -> TypeDescription {
    match resolve_snippet(body, expr) {
        Resolution::Found(desc) => desc,
        other => panic!("expected a description for {expr}, got {other:?}"),
    }
}
