//! Candidate PHP file discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;
use tracing::{debug, info};

use peek_error::{Error, Result};

/// Directories never worth searching for `assign` calls.
fn is_default_skip_dir(name: &str) -> bool {
    matches!(
        name,
        "vendor"
            | "node_modules"
            | "bower_components"
            // Smarty compile and cache output
            | "templates_c"
            | "cache"
            | "var"
            // Build output
            | "build"
            | "dist"
            | "target"
    )
}

/// Where and what to search.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    /// Extra directory names to skip, on top of the defaults.
    pub skip_dirs: Vec<String>,
    /// Extensions without the leading dot.
    pub extensions: Vec<String>,
}

/// Collect candidate files: explicit `files` first in the given order, then
/// every matching file under `dirs`, sorted. Duplicates are dropped.
pub fn discover_candidates(opts: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    let discovery_start = Instant::now();
    let extensions: HashSet<String> = opts
        .extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect();
    let extra_skips: HashSet<String> = opts
        .skip_dirs
        .iter()
        .map(|dir| dir.to_ascii_lowercase())
        .collect();

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for file in &opts.files {
        if seen.insert(file.clone()) {
            files.push(file.clone());
        }
    }

    let mut walked = Vec::new();
    for dir in &opts.dirs {
        let extra_skips = extra_skips.clone();
        let mut builder = WalkBuilder::new(dir);
        builder
            .standard_filters(true)
            .follow_links(false)
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let Some(file_type) = entry.file_type() else {
                    return true;
                };
                if !file_type.is_dir() {
                    return true;
                }
                let Some(name) = entry.file_name().to_str() else {
                    return true;
                };
                let name = name.to_ascii_lowercase();
                !is_default_skip_dir(&name) && !extra_skips.contains(&name)
            });

        for entry in builder.build() {
            let entry = entry.map_err(|err| {
                Error::traversal_failed(format!("failed to walk {}", dir.display()))
                    .with_path(dir)
                    .set_source(err)
            })?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if has_extension(entry.path(), &extensions) {
                walked.push(entry.into_path());
            }
        }
    }

    walked.sort();
    for path in walked {
        if seen.insert(path.clone()) {
            files.push(path);
        }
    }

    debug!(
        elapsed_secs = discovery_start.elapsed().as_secs_f64(),
        "candidate discovery"
    );
    info!(count = files.len(), "candidate files discovered");
    Ok(files)
}

fn has_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext.to_ascii_lowercase()))
}
