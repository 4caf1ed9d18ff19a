//! Relative import rewriting
//!
//! Finds `from '<relative path>';` at the end of a line and appends the
//! configured extension to the path. The match is purely textual: multi-line
//! import clauses, double-quoted specifiers and trailing comments are left
//! alone. Lines ending in `\r\n` match too, and keep their line ending.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::config::RewriteConfig;
use crate::error::{Result, RewriteError};

/// `from '` + path starting with `.` or `..` + `';` at end of line (`\n` or `\r\n`).
static RELATIVE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mR)from '(\.\.?[^']*)';$").expect("RELATIVE_IMPORT regex is invalid")
});

/// Result of rewriting one piece of text.
#[derive(Debug)]
pub struct Rewrite<'a> {
    /// Rewritten text, borrowed from the input when nothing changed
    pub text: Cow<'a, str>,
    /// Number of import paths that received the extension
    pub imports: usize,
}

impl Rewrite<'_> {
    pub fn is_changed(&self) -> bool {
        matches!(self.text, Cow::Owned(_))
    }
}

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    /// The file was rewritten (or would have been, in a dry run)
    Rewritten { imports: usize },
}

/// Append the configured extension to every qualifying relative import.
///
/// A path is left as-is when it already ends with the extension or starts
/// with one of the excluded prefixes.
pub fn rewrite_imports<'a>(content: &'a str, config: &RewriteConfig) -> Rewrite<'a> {
    let extension = config.extension.as_str();
    let mut imports = 0;

    let text = RELATIVE_IMPORT.replace_all(content, |caps: &Captures| {
        let path = &caps[1];
        if path.ends_with(extension) || config.is_excluded(path) {
            caps[0].to_string()
        } else {
            imports += 1;
            format!("from '{}{}';", path, extension)
        }
    });

    if imports == 0 {
        // replace_all allocates whenever the pattern matched, even if every
        // replacement was the original text
        return Rewrite {
            text: Cow::Borrowed(content),
            imports,
        };
    }

    Rewrite { text, imports }
}

/// Rewrite the imports of one file in place.
///
/// The file is only written when its content changed, and never in a dry
/// run. Read and write failures are returned with the offending path.
pub fn rewrite_imports_in_file(path: &Path, config: &RewriteConfig) -> Result<FileOutcome> {
    let content = fs::read_to_string(path).map_err(|e| RewriteError::io(path, e))?;

    let rewrite = rewrite_imports(&content, config);
    if !rewrite.is_changed() {
        debug!(path = %path.display(), "no imports to fix");
        return Ok(FileOutcome::Unchanged);
    }

    if config.dry_run {
        debug!(path = %path.display(), imports = rewrite.imports, "dry run, not writing");
    } else {
        fs::write(path, rewrite.text.as_bytes()).map_err(|e| RewriteError::io(path, e))?;
        info!(path = %path.display(), imports = rewrite.imports, "rewrote imports");
    }

    Ok(FileOutcome::Rewritten {
        imports: rewrite.imports,
    })
}
