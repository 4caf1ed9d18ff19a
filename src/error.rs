//! Error types for import rewriting

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can stop a rewrite run.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// A file or the root directory could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The directory walker could not descend into an entry.
    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// An `--ignore` pattern is not a valid glob.
    #[error("invalid ignore pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A reporter could not write to its output.
    #[error("error writing output: {0}")]
    Output(#[source] io::Error),
}

impl RewriteError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Path the error refers to, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Walk(err) => walk_error_path(err),
            Self::Pattern { .. } | Self::Output(_) => None,
        }
    }
}

fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        _ => None,
    }
}

pub type Result<T> = std::result::Result<T, RewriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_path() {
        let err = RewriteError::io(
            "api/a.ts",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.starts_with("api/a.ts"), "got: {}", message);
        assert!(message.contains("denied"));
        assert_eq!(err.path(), Some(Path::new("api/a.ts")));
    }

    #[test]
    fn test_pattern_error_has_no_path() {
        let source = glob::Pattern::new("[").unwrap_err();
        let err = RewriteError::Pattern {
            pattern: "[".to_string(),
            source,
        };
        assert!(err.path().is_none());
        assert!(err.to_string().contains("'['"));
    }
}
