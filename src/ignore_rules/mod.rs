// src/ignore_rules/mod.rs

//! Compiles the root's ignore file, the built-in exclusion table, and
//! caller-supplied patterns into a single deny predicate.
//!
//! All three sources are additive deny rules; there is no un-ignore layer.
//! The filter is built once per scan/aggregation and is immutable afterwards.

use crate::constants::DEFAULT_IGNORE_PATTERNS;
use crate::errors::{Error, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, warn};
use std::path::Path;

/// Compiled ignore predicate over root-relative, forward-slash paths.
#[derive(Debug)]
pub struct IgnoreFilter {
    /// Root ignore file plus caller-supplied patterns.
    user: Gitignore,
    /// The fixed built-in exclusion table, kept separate so callers can tell
    /// a default exclusion apart from a user one.
    defaults: Gitignore,
}

impl IgnoreFilter {
    /// Builds the filter for `root`. The root's `.gitignore` is parsed if
    /// present; invalid caller patterns are logged and skipped rather than
    /// failing the build.
    pub fn load(root: &Path, extra_patterns: &[String]) -> Result<IgnoreFilter> {
        let mut user_builder = GitignoreBuilder::new(root);

        let ignore_file = root.join(".gitignore");
        if ignore_file.is_file() {
            if let Some(err) = user_builder.add(&ignore_file) {
                warn!(
                    "Partially parsed ignore file '{}': {}",
                    ignore_file.display(),
                    err
                );
            } else {
                debug!("Loaded ignore file: {}", ignore_file.display());
            }
        }

        for pattern in extra_patterns {
            if let Err(err) = user_builder.add_line(None, pattern) {
                warn!("Skipping invalid exclusion pattern '{}': {}", pattern, err);
            }
        }

        let user = user_builder
            .build()
            .map_err(|e| Error::IgnorePatterns(e.to_string()))?;

        let mut default_builder = GitignoreBuilder::new(root);
        for pattern in DEFAULT_IGNORE_PATTERNS {
            default_builder
                .add_line(None, pattern)
                .map_err(|e| Error::IgnorePatterns(e.to_string()))?;
        }
        let defaults = default_builder
            .build()
            .map_err(|e| Error::IgnorePatterns(e.to_string()))?;

        Ok(IgnoreFilter { user, defaults })
    }

    /// Whether `relative_path` is excluded by any source.
    ///
    /// The path must be root-relative with forward slashes; absolute paths
    /// are a caller bug and are not re-relativized here.
    pub fn ignores(&self, relative_path: &Path, is_dir: bool) -> bool {
        self.user
            .matched_path_or_any_parents(relative_path, is_dir)
            .is_ignore()
            || self.is_default_excluded(relative_path, is_dir)
    }

    /// Whether the built-in exclusion table (alone) matches the path.
    pub fn is_default_excluded(&self, relative_path: &Path, is_dir: bool) -> bool {
        self.defaults
            .matched_path_or_any_parents(relative_path, is_dir)
            .is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_root_ignore_file_patterns_apply() -> Result<()> {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(".gitignore"), "*.log\nsecrets/\n").unwrap();

        let filter = IgnoreFilter::load(temp.path(), &[])?;
        assert!(filter.ignores(Path::new("app.log"), false));
        assert!(filter.ignores(Path::new("secrets/key.pem"), false));
        assert!(!filter.ignores(Path::new("src/main.rs"), false));
        Ok(())
    }

    #[test]
    fn test_builtin_exclusions_always_apply() -> Result<()> {
        let temp = tempdir().unwrap();
        let filter = IgnoreFilter::load(temp.path(), &[])?;

        assert!(filter.ignores(Path::new("node_modules"), true));
        assert!(filter.ignores(Path::new("node_modules/left-pad/index.js"), false));
        assert!(filter.ignores(Path::new(".git"), true));
        assert!(filter.ignores(Path::new("package-lock.json"), false));
        assert!(filter.is_default_excluded(Path::new("yarn.lock"), false));
        assert!(!filter.is_default_excluded(Path::new("src/lib.rs"), false));
        Ok(())
    }

    #[test]
    fn test_caller_patterns_are_additive() -> Result<()> {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(".gitignore"), "*.log\n").unwrap();

        let filter = IgnoreFilter::load(temp.path(), &["*.tmp".to_string()])?;
        assert!(filter.ignores(Path::new("scratch.tmp"), false));
        assert!(filter.ignores(Path::new("app.log"), false));
        assert!(!filter.is_default_excluded(Path::new("scratch.tmp"), false));
        Ok(())
    }

    #[test]
    fn test_invalid_caller_pattern_is_skipped() -> Result<()> {
        let temp = tempdir().unwrap();
        // An unclosed character class cannot compile; the filter builds anyway.
        let filter = IgnoreFilter::load(temp.path(), &["[".to_string(), "*.tmp".to_string()])?;
        assert!(filter.ignores(Path::new("scratch.tmp"), false));
        Ok(())
    }

    #[test]
    fn test_missing_ignore_file_is_fine() -> Result<()> {
        let temp = tempdir().unwrap();
        let filter = IgnoreFilter::load(temp.path(), &[])?;
        assert!(!filter.ignores(Path::new("anything.txt"), false));
        Ok(())
    }
}
