//! Configuration for import rewriting

use std::path::PathBuf;

/// Directory scanned when no root is given.
pub const DEFAULT_ROOT: &str = "api";

/// File name suffix selecting source files.
pub const DEFAULT_SUFFIX: &str = ".ts";

/// Extension appended to relative import paths.
pub const DEFAULT_EXTENSION: &str = ".js";

/// Import path prefix that is never rewritten.
pub const DEFAULT_EXCLUDED_PREFIX: &str = "./node_modules";

/// What to do when a file or directory cannot be processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop at the first error. Files already rewritten stay rewritten.
    #[default]
    Abort,
    /// Record the failure and move on to the next file.
    Continue,
}

/// Configuration for a rewrite run.
#[derive(Debug, Clone)]
pub struct RewriteConfig {
    pub root: PathBuf,
    /// File name suffixes to scan (plain `ends_with`, so `.ts` also selects `.d.ts`)
    pub suffixes: Vec<String>,
    pub extension: String,
    pub excluded_prefixes: Vec<String>,
    /// Glob patterns matched against entry names; matching directories are not descended
    pub ignore_patterns: Vec<String>,
    pub on_error: ErrorPolicy,
    /// Report what would change without writing anything
    pub dry_run: bool,
}

impl RewriteConfig {
    /// Default configuration rooted somewhere other than `api`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Check whether a file name selects the file for scanning.
    pub fn matches_suffix(&self, file_name: &str) -> bool {
        self.suffixes.iter().any(|s| file_name.ends_with(s.as_str()))
    }

    /// Check whether an import path starts with an excluded prefix.
    pub fn is_excluded(&self, import_path: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|p| import_path.starts_with(p.as_str()))
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            suffixes: vec![DEFAULT_SUFFIX.to_string()],
            extension: DEFAULT_EXTENSION.to_string(),
            excluded_prefixes: vec![DEFAULT_EXCLUDED_PREFIX.to_string()],
            ignore_patterns: Vec::new(),
            on_error: ErrorPolicy::Abort,
            dry_run: false,
        }
    }
}
