//! Candidate iteration: cache → locate → infer, first match wins.
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use peek_error::Error;

use crate::cache::SourceCache;
use crate::cancel::CancelToken;
use crate::describe::{BindingSite, Resolution};
use crate::lang_def::LanguageTrait;
use crate::option::ResolveOption;
use crate::path::VariablePath;

/// Resolves template variables against an ordered list of candidate files.
///
/// Failures on individual files (missing, unparsable) are logged and skipped;
/// `resolve` always produces a [`Resolution`].
pub struct Resolver<'c, L: LanguageTrait> {
    cache: &'c SourceCache<L>,
    option: ResolveOption,
}

impl<'c, L: LanguageTrait> Resolver<'c, L> {
    pub fn new(cache: &'c SourceCache<L>) -> Self {
        Self {
            cache,
            option: ResolveOption::default(),
        }
    }

    pub fn with_option(mut self, option: ResolveOption) -> Self {
        self.option = option;
        self
    }

    pub fn option(&self) -> &ResolveOption {
        &self.option
    }

    pub fn cache(&self) -> &'c SourceCache<L> {
        self.cache
    }

    /// Resolve `variable` by scanning `candidates` in order.
    ///
    /// - empty candidate list → [`Resolution::SearchUnavailable`]
    /// - first file containing a binding decides the result
    /// - cancellation, or no binding anywhere → [`Resolution::NotFound`]
    #[tracing::instrument(skip_all, fields(variable = %variable, files = candidates.len()))]
    pub fn resolve(
        &self,
        variable: &VariablePath,
        candidates: &[PathBuf],
        token: &CancelToken,
    ) -> Resolution {
        if candidates.is_empty() {
            warn!("no candidate files to search");
            return Resolution::SearchUnavailable;
        }

        for file in candidates {
            if token.is_cancelled() {
                debug!("resolution cancelled between files");
                return Resolution::NotFound;
            }

            let tree = match self.cache.get(file) {
                Ok(tree) => tree,
                Err(err) => {
                    report_skip(file, &err);
                    continue;
                }
            };

            let Some(binding) = L::locate(tree.as_ref(), variable.root(), token) else {
                if token.is_cancelled() {
                    debug!(path = %file.display(), "resolution cancelled mid-walk");
                    return Resolution::NotFound;
                }
                continue;
            };

            info!(
                path = %file.display(),
                line = binding.call_site_line,
                "binding located"
            );
            let line = binding.call_site_line;
            let site_doc = binding.doc_comment.map(str::to_string);

            return match L::infer(binding.bound_expression, file, &self.option) {
                Some(desc) => {
                    let desc = desc.apply_binding_site(file.clone(), line, site_doc);
                    Resolution::Found(variable.project(desc))
                }
                None => {
                    debug!(path = %file.display(), "bound expression not classified");
                    Resolution::Unclassified(BindingSite {
                        file: file.clone(),
                        line,
                        doc_comment: site_doc,
                    })
                }
            };
        }

        debug!("no binding found in any candidate");
        Resolution::NotFound
    }

    /// Convenience for a bare variable name without access steps.
    pub fn resolve_name(
        &self,
        name: &str,
        candidates: &[PathBuf],
        token: &CancelToken,
    ) -> Resolution {
        self.resolve(&VariablePath::root_only(name), candidates, token)
    }
}

fn report_skip(file: &Path, err: &Error) {
    if err.is_file_missing() {
        debug!(path = %file.display(), "skipping missing candidate");
    } else if err.is_parse_failure() {
        warn!(
            path = %file.display(),
            line = ?err.line(),
            message = err.message(),
            "skipping candidate that failed to parse"
        );
    } else {
        warn!(path = %file.display(), error = %err, "skipping unreadable candidate");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use crate::describe::{TypeDescription, TypeKind};
    use crate::tests::{LangSimple, bump_mtime, write_source};

    fn resolve(cache: &SourceCache<LangSimple>, name: &str, files: &[PathBuf]) -> Resolution {
        Resolver::new(cache).resolve_name(name, files, &CancelToken::new())
    }

    #[test]
    fn empty_candidate_list_is_unavailable() {
        let cache = SourceCache::<LangSimple>::new();
        assert_eq!(resolve(&cache, "user", &[]), Resolution::SearchUnavailable);
    }

    #[test]
    fn first_matching_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let src = "assign other int\nassign user new User\n";
        let a = write_source(dir.path(), "a.simple", src);
        let b = write_source(dir.path(), "b.simple", "assign user new Admin\n");
        let cache = SourceCache::<LangSimple>::new();

        let found = resolve(&cache, "user", &[a.clone(), b.clone()]);
        let desc = found.description().unwrap();
        assert_eq!(desc.type_name, "User");
        assert!(desc.is_entity);
        assert_eq!(desc.source_file.as_deref(), Some(a.as_path()));
        assert_eq!(desc.source_line, Some(2));

        let found = resolve(&cache, "user", &[b, a]);
        assert_eq!(found.description().unwrap().type_name, "Admin");
    }

    #[test]
    fn broken_and_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.simple");
        let broken = write_source(dir.path(), "broken.simple", "assign user !\n");
        let good = write_source(dir.path(), "good.simple", "assign user string\n");
        let cache = SourceCache::<LangSimple>::new();

        let found = resolve(&cache, "user", &[missing, broken, good]);
        assert_eq!(
            found,
            Resolution::Found(
                TypeDescription::primitive("string")
                    .with_source(Some(dir.path().join("good.simple")), Some(1))
            )
        );
    }

    #[test]
    fn no_binding_anywhere_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_source(dir.path(), "a.simple", "assign users int\n");
        let cache = SourceCache::<LangSimple>::new();
        assert_eq!(resolve(&cache, "user", &[a]), Resolution::NotFound);
        assert_eq!(
            resolve(&cache, "user", &[dir.path().join("none.simple")]),
            Resolution::NotFound
        );
    }

    #[test]
    fn cancelled_token_stops_before_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_source(dir.path(), "a.simple", "assign user int\n");
        let cache = SourceCache::<LangSimple>::new();
        let token = CancelToken::new();
        token.cancel();

        let result = Resolver::new(&cache).resolve_name("user", &[a], &token);
        assert_eq!(result, Resolution::NotFound);
        assert_eq!(cache.metrics().parses, 0);
    }

    #[test]
    fn unclassified_value_keeps_binding_site() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_source(dir.path(), "a.simple", "/** odd */\nassign user ?\n");
        let b = write_source(dir.path(), "b.simple", "assign user int\n");
        let cache = SourceCache::<LangSimple>::new();

        let result = resolve(&cache, "user", &[a.clone(), b]);
        assert_eq!(
            result,
            Resolution::Unclassified(BindingSite {
                file: a,
                line: 2,
                doc_comment: Some("/** odd */".into()),
            })
        );
    }

    #[test]
    fn doc_comment_and_field_projection() {
        let dir = tempfile::tempdir().unwrap();
        let src = "/** Current user */\nassign user new User\n";
        let a = write_source(dir.path(), "a.simple", src);
        let cache = SourceCache::<LangSimple>::new();
        let resolver = Resolver::new(&cache);

        let path = VariablePath::parse("user.name").unwrap();
        let result = resolver.resolve(&path, &[a.clone()], &CancelToken::new());
        let desc = result.description().unwrap();
        assert_eq!(desc.kind, TypeKind::Unknown);
        assert_eq!(desc.type_name, "mixed");
        assert_eq!(desc.source_file.as_deref(), Some(a.as_path()));
        assert_eq!(desc.doc_comment.as_deref(), Some("/** Current user */"));
    }

    #[test]
    fn edits_between_queries_are_observed() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_source(dir.path(), "a.simple", "assign user int\n");
        let cache = SourceCache::<LangSimple>::new();
        let files = [a.clone()];
        let found = resolve(&cache, "user", &files);
        assert_eq!(found.description().unwrap().type_name, "int");

        std::fs::write(&a, "assign user new User\n").unwrap();
        bump_mtime(&a, Duration::from_secs(10));
        let found = resolve(&cache, "user", &files);
        assert_eq!(found.description().unwrap().type_name, "User");
    }
}
