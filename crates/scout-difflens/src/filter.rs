//! Path filtering applied before payload assembly.

use std::path::Path;

use scout_core::{ChangedFile, ReviewConfig};
use tracing::{debug, warn};

/// Glob-based filter for files that should never reach the model.
///
/// # Examples
///
/// ```
/// use scout_difflens::filter::PathFilter;
///
/// let filter = PathFilter::new(&["*.lock".to_string(), "vendor/**".to_string()]);
/// assert!(filter.should_skip("Cargo.lock"));
/// assert!(filter.should_skip("vendor/lib/x.js"));
/// assert!(!filter.should_skip("src/main.rs"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    patterns: Vec<glob::Pattern>,
}

impl PathFilter {
    /// Compile the given glob patterns. Invalid patterns are logged and ignored.
    pub fn new(patterns: &[String]) -> Self {
        let mut compiled = Vec::new();
        for pat in patterns {
            match glob::Pattern::new(pat) {
                Ok(p) => compiled.push(p),
                Err(e) => warn!(pattern = %pat, error = %e, "ignoring invalid skip pattern"),
            }
        }
        Self { patterns: compiled }
    }

    /// Create a filter from review configuration.
    pub fn from_config(config: &ReviewConfig) -> Self {
        Self::new(&config.skip_patterns)
    }

    /// Check if a single path should be skipped.
    ///
    /// A pattern matches either the whole path or its final component, so
    /// `Cargo.lock` also skips `crates/core/Cargo.lock`.
    pub fn should_skip(&self, path: &str) -> bool {
        let file_name = Path::new(path)
            .file_name()
            .map(|f| f.to_string_lossy())
            .unwrap_or_default();
        self.patterns
            .iter()
            .any(|p| p.matches(path) || p.matches(&file_name))
    }

    /// Drop skipped files, preserving the order of the rest.
    ///
    /// # Examples
    ///
    /// ```
    /// use scout_core::{ChangedFile, FileStatus};
    /// use scout_difflens::filter::PathFilter;
    ///
    /// let files = vec![
    ///     ChangedFile { filename: "b.rs".into(), status: FileStatus::Added, patch: None },
    ///     ChangedFile { filename: "Cargo.lock".into(), status: FileStatus::Modified, patch: None },
    ///     ChangedFile { filename: "a.rs".into(), status: FileStatus::Added, patch: None },
    /// ];
    /// let kept = PathFilter::new(&["*.lock".into()]).apply(files);
    /// let names: Vec<_> = kept.iter().map(|f| f.filename.as_str()).collect();
    /// assert_eq!(names, ["b.rs", "a.rs"]);
    /// ```
    pub fn apply(&self, files: Vec<ChangedFile>) -> Vec<ChangedFile> {
        if self.patterns.is_empty() {
            return files;
        }
        files
            .into_iter()
            .filter(|f| {
                let skip = self.should_skip(&f.filename);
                if skip {
                    debug!(file = %f.filename, "skipped by pattern");
                }
                !skip
            })
            .collect()
    }
}
