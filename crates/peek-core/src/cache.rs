//! Per-path cache of parsed source trees, invalidated by file mtime.
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use dashmap::DashMap;
use tracing::{debug, trace};

use peek_error::Result;

use crate::file::{SourceFile, modified_time};
use crate::lang_def::LanguageTrait;

/// A parsed tree plus the mtime of the file when it was read.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub tree: Arc<T>,
    pub last_modified: SystemTime,
}

/// Counters describing cache behaviour, mainly for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    /// Number of times the frontend parser actually ran.
    pub parses: u64,
    pub failures: u64,
}

/// Session-scoped store of parsed trees keyed by path.
///
/// Constructed by the host and handed to the resolver. Each entry is
/// invalidated on its own when the file's mtime moves past the stored one;
/// there is no global expiry. Call [`SourceCache::clear`] when the session
/// ends.
pub struct SourceCache<L: LanguageTrait> {
    entries: DashMap<PathBuf, CacheEntry<L::Tree>>,
    hits: AtomicU64,
    misses: AtomicU64,
    parses: AtomicU64,
    failures: AtomicU64,
    _language: PhantomData<fn() -> L>,
}

impl<L: LanguageTrait> Default for SourceCache<L> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            parses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            _language: PhantomData,
        }
    }
}

impl<L: LanguageTrait> SourceCache<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the tree for `path`, parsing only when there is no entry or the
    /// file changed since the entry was built.
    ///
    /// A missing file yields `ErrorKind::FileNotFound`; a parse failure purges
    /// the entry and propagates the parser's error.
    pub fn get(&self, path: &Path) -> Result<Arc<L::Tree>> {
        let current = match modified_time(path) {
            Ok(time) => time,
            Err(err) => {
                if err.is_file_missing() {
                    self.entries.remove(path);
                }
                return Err(err.with_operation("cache::get"));
            }
        };

        if let Some(tree) = self.fresh_tree(path, current) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(path = %path.display(), "cache hit");
            return Ok(tree);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let file = match SourceFile::read(path) {
            Ok(file) => file,
            Err(err) => {
                self.entries.remove(path);
                return Err(err.with_operation("cache::get"));
            }
        };

        self.parses.fetch_add(1, Ordering::Relaxed);
        match L::parse(file.content(), path) {
            Ok(tree) => {
                let tree = Arc::new(tree);
                debug!(path = %path.display(), lang = L::name(), "parsed and cached");
                self.entries.insert(
                    path.to_path_buf(),
                    CacheEntry {
                        tree: Arc::clone(&tree),
                        last_modified: file.modified,
                    },
                );
                Ok(tree)
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                self.entries.remove(path);
                Err(err.with_operation("cache::get").with_path(path))
            }
        }
    }

    fn fresh_tree(&self, path: &Path, current: SystemTime) -> Option<Arc<L::Tree>> {
        let entry = self.entries.get(path)?;
        (entry.last_modified >= current).then(|| Arc::clone(&entry.tree))
    }

    /// Drop the entry for one path.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Drop every entry. Metrics are kept.
    pub fn clear(&self) {
        let count = self.entries.len();
        self.entries.clear();
        debug!(count, "source cache cleared");
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Stored mtime for `path`, if cached.
    pub fn last_modified(&self, path: &Path) -> Option<SystemTime> {
        self.entries.get(path).map(|entry| entry.last_modified)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            parses: self.parses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use crate::tests::{LangSimple, bump_mtime, write_source};

    #[test]
    fn unchanged_file_is_parsed_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "a.simple", "assign user new User\n");
        let cache = SourceCache::<LangSimple>::new();

        let first = cache.get(&path).unwrap();
        let second = cache.get(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            cache.metrics(),
            CacheMetrics {
                hits: 1,
                misses: 1,
                parses: 1,
                failures: 0,
            }
        );
    }

    #[test]
    fn newer_mtime_triggers_reparse() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "a.simple", "assign user new User\n");
        let cache = SourceCache::<LangSimple>::new();
        cache.get(&path).unwrap();
        let stored = cache.last_modified(&path).unwrap();

        std::fs::write(&path, "assign user new Admin\n").unwrap();
        bump_mtime(&path, Duration::from_secs(10));

        let tree = cache.get(&path).unwrap();
        assert_eq!(tree.root.children[0].children[0].text, "new Admin");
        assert_eq!(cache.metrics().parses, 2);
        assert!(cache.last_modified(&path).unwrap() > stored);
    }

    #[test]
    fn parse_failure_purges_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "a.simple", "assign user int\n");
        let cache = SourceCache::<LangSimple>::new();
        cache.get(&path).unwrap();
        assert!(cache.contains(&path));

        std::fs::write(&path, "assign user int\nassign ! broken\n").unwrap();
        bump_mtime(&path, Duration::from_secs(10));

        let err = cache.get(&path).unwrap_err();
        assert!(err.is_parse_failure());
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.operation(), "cache::get");
        assert!(!cache.contains(&path));
        assert_eq!(cache.metrics().failures, 1);
    }

    #[test]
    fn missing_file_reports_not_found_and_drops_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "a.simple", "assign user int\n");
        let cache = SourceCache::<LangSimple>::new();
        cache.get(&path).unwrap();

        std::fs::remove_file(&path).unwrap();
        let err = cache.get(&path).unwrap_err();
        assert!(err.is_file_missing());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.simple");
        std::fs::write(&path, [0x61, 0xff, 0xfe]).unwrap();
        let cache = SourceCache::<LangSimple>::new();

        let err = cache.get(&path).unwrap_err();
        assert_eq!(err.kind(), peek_error::ErrorKind::EncodingError);
    }

    #[test]
    fn clear_and_invalidate_remove_entries() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_source(dir.path(), "a.simple", "assign a int\n");
        let b = write_source(dir.path(), "b.simple", "assign b int\n");
        let cache = SourceCache::<LangSimple>::new();
        cache.get(&a).unwrap();
        cache.get(&b).unwrap();
        assert_eq!(cache.len(), 2);

        assert!(cache.invalidate(&a));
        assert!(!cache.invalidate(&a));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        cache.get(&b).unwrap();
        assert_eq!(cache.metrics().parses, 3);
    }
}
