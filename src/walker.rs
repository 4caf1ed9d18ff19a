//! Directory traversal for import rewriting
//!
//! Walks every entry under the root (hidden files and `.gitignore`d paths
//! included), picks the files whose name ends with a configured suffix and
//! rewrites them one at a time in file-name order.

use std::fs;
use std::path::Path;

use glob::Pattern;
use ignore::{DirEntry, WalkBuilder};
use tracing::{debug, warn};

use crate::config::{ErrorPolicy, RewriteConfig};
use crate::error::{Result, RewriteError};
use crate::report::{FileFailure, FixedFile, Reporter, RunSummary};
use crate::rewrite::{FileOutcome, rewrite_imports_in_file};

/// Rewrite imports in every matching file under `config.root`.
///
/// Each rewritten file is passed to `reporter` as soon as it is written, and
/// `reporter.finish` receives the summary once the walk completes. Under
/// [`ErrorPolicy::Abort`] the first error ends the walk and is returned;
/// files rewritten before it are not rolled back.
pub fn rewrite_imports_in_tree<R: Reporter + ?Sized>(
    config: &RewriteConfig,
    reporter: &mut R,
) -> Result<RunSummary> {
    let patterns = compile_ignore_patterns(&config.ignore_patterns)?;
    fs::metadata(&config.root).map_err(|e| RewriteError::io(&config.root, e))?;

    let mut summary = RunSummary::new(config.dry_run);

    for entry in build_walker(&config.root, patterns) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                handle_error(RewriteError::Walk(err), config, &mut summary, reporter)?;
                continue;
            }
        };

        if !is_candidate(&entry, config) {
            continue;
        }

        let path = entry.path();
        summary.scanned += 1;
        debug!(path = %path.display(), "scanning");

        match rewrite_imports_in_file(path, config) {
            Ok(FileOutcome::Unchanged) => {}
            Ok(FileOutcome::Rewritten { imports }) => {
                let fixed = FixedFile {
                    path: path.to_path_buf(),
                    imports,
                };
                reporter.file_fixed(&fixed).map_err(RewriteError::Output)?;
                summary.record_fixed(fixed);
            }
            Err(err) => handle_error(err, config, &mut summary, reporter)?,
        }
    }

    reporter.finish(&summary).map_err(RewriteError::Output)?;
    Ok(summary)
}

/// Parse ignore globs up front so a bad pattern fails before any file is touched.
pub fn compile_ignore_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| RewriteError::Pattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

fn build_walker(root: &Path, patterns: Vec<Pattern>) -> ignore::Walk {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    if !patterns.is_empty() {
        builder.filter_entry(move |entry| {
            // The root is always walked, whatever its name
            entry.depth() == 0 || !is_ignored(entry, &patterns)
        });
    }

    builder.build()
}

fn is_ignored(entry: &DirEntry, patterns: &[Pattern]) -> bool {
    let name = entry.file_name().to_string_lossy();
    let ignored = patterns.iter().any(|p| p.matches(&name));
    if ignored {
        debug!(path = %entry.path().display(), "ignored by pattern");
    }
    ignored
}

/// Regular files (or symlinks to them) whose name ends with a configured suffix.
///
/// A dangling symlink counts as a file, so reading it fails with `NotFound`
/// under the active error policy.
fn is_candidate(entry: &DirEntry, config: &RewriteConfig) -> bool {
    let is_file = match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => fs::metadata(entry.path()).map_or(true, |m| m.is_file()),
        _ => false,
    };
    is_file && config.matches_suffix(&entry.file_name().to_string_lossy())
}

fn handle_error<R: Reporter + ?Sized>(
    err: RewriteError,
    config: &RewriteConfig,
    summary: &mut RunSummary,
    reporter: &mut R,
) -> Result<()> {
    match config.on_error {
        ErrorPolicy::Abort => Err(err),
        ErrorPolicy::Continue => {
            warn!(error = %err, "skipping after error");
            let failure = FileFailure {
                path: err.path().map(Path::to_path_buf),
                error: err.to_string(),
            };
            reporter.file_failed(&failure).map_err(RewriteError::Output)?;
            summary.record_failure(failure);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;
    use std::io;
    use std::path::PathBuf;

    /// Reporter that remembers what it was told.
    #[derive(Default)]
    struct RecordingReporter {
        fixed: Vec<PathBuf>,
        failed: Vec<String>,
        finished: bool,
    }

    impl Reporter for RecordingReporter {
        fn file_fixed(&mut self, file: &FixedFile) -> io::Result<()> {
            self.fixed.push(file.path.clone());
            Ok(())
        }

        fn file_failed(&mut self, failure: &FileFailure) -> io::Result<()> {
            self.failed.push(failure.error.clone());
            Ok(())
        }

        fn finish(&mut self, _summary: &RunSummary) -> io::Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn config_for(tree: &TestTree) -> RewriteConfig {
        RewriteConfig::with_root(tree.join("api"))
    }

    #[test]
    fn test_end_to_end_reference_scenario() {
        let tree = TestTree::new();
        tree.add_file("api/a.ts", "import { x } from '../lib';\n");
        tree.add_file("api/b.ts", "import { y } from './y.js';\n");

        let mut reporter = RecordingReporter::default();
        let summary = rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap();

        assert_eq!(tree.read("api/a.ts"), "import { x } from '../lib.js';\n");
        assert_eq!(tree.read("api/b.ts"), "import { y } from './y.js';\n");
        assert_eq!(reporter.fixed, vec![tree.join("api/a.ts")]);
        assert!(reporter.finished);
        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.imports_rewritten, 1);
    }

    #[test]
    fn test_non_matching_suffix_is_never_touched() {
        let tree = TestTree::new();
        tree.add_file("api/c.txt", "import { x } from './x';\n");
        tree.add_file("api/d.tsx", "import { x } from './x';\n");

        let mut reporter = RecordingReporter::default();
        let summary = rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap();

        assert_eq!(summary.scanned, 0);
        assert!(reporter.fixed.is_empty());
        assert_eq!(tree.read("api/c.txt"), "import { x } from './x';\n");
        assert_eq!(tree.read("api/d.tsx"), "import { x } from './x';\n");
    }

    #[test]
    fn test_descends_into_nested_and_hidden_directories() {
        let tree = TestTree::new();
        tree.add_file("api/routes/v1/users.ts", "import u from '../../models/user';\n");
        tree.add_file("api/.hidden/h.ts", "import h from './h';\n");
        tree.add_file("api/.gitignore", "routes/\n");

        let mut reporter = RecordingReporter::default();
        rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap();

        assert_eq!(
            tree.read("api/routes/v1/users.ts"),
            "import u from '../../models/user.js';\n"
        );
        assert_eq!(tree.read("api/.hidden/h.ts"), "import h from './h.js';\n");
        assert_eq!(reporter.fixed.len(), 2);
    }

    #[test]
    fn test_visits_files_in_name_order() {
        let tree = TestTree::new();
        tree.add_file("api/c.ts", "import c from './c';\n");
        tree.add_file("api/a.ts", "import a from './a';\n");
        tree.add_file("api/b/z.ts", "import z from './z';\n");

        let mut reporter = RecordingReporter::default();
        rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap();

        assert_eq!(
            reporter.fixed,
            vec![
                tree.join("api/a.ts"),
                tree.join("api/b/z.ts"),
                tree.join("api/c.ts"),
            ]
        );
    }

    #[test]
    fn test_ignore_patterns_skip_files_and_directories() {
        let tree = TestTree::new();
        tree.add_file("api/keep.ts", "import k from './k';\n");
        tree.add_file("api/skip.spec.ts", "import s from './s';\n");
        tree.add_file("api/generated/g.ts", "import g from './g';\n");

        let config = RewriteConfig {
            ignore_patterns: vec!["*.spec.ts".to_string(), "generated".to_string()],
            ..config_for(&tree)
        };
        let mut reporter = RecordingReporter::default();
        let summary = rewrite_imports_in_tree(&config, &mut reporter).unwrap();

        assert_eq!(reporter.fixed, vec![tree.join("api/keep.ts")]);
        assert_eq!(summary.scanned, 1);
        assert_eq!(tree.read("api/skip.spec.ts"), "import s from './s';\n");
        assert_eq!(tree.read("api/generated/g.ts"), "import g from './g';\n");
    }

    #[test]
    fn test_invalid_ignore_pattern_fails_before_walking() {
        let tree = TestTree::new();
        tree.add_file("api/a.ts", "import a from './a';\n");

        let config = RewriteConfig {
            ignore_patterns: vec!["[".to_string()],
            ..config_for(&tree)
        };
        let mut reporter = RecordingReporter::default();
        let err = rewrite_imports_in_tree(&config, &mut reporter).unwrap_err();

        assert!(matches!(err, RewriteError::Pattern { .. }));
        assert_eq!(tree.read("api/a.ts"), "import a from './a';\n");
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let tree = TestTree::new();
        let mut reporter = RecordingReporter::default();
        let err = rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap_err();

        match err {
            RewriteError::Io { path, source } => {
                assert_eq!(path, tree.join("api"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {:?}", other),
        }
        assert!(!reporter.finished);
    }

    #[test]
    fn test_abort_stops_at_first_error_without_rollback() {
        let tree = TestTree::new();
        tree.add_file("api/a.ts", "import a from './a';\n");
        tree.add_bytes("api/b.ts", &[0xFF, 0xFE, 0x00]);
        tree.add_file("api/c.ts", "import c from './c';\n");

        let mut reporter = RecordingReporter::default();
        let err = rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap_err();

        assert_eq!(err.path(), Some(tree.join("api/b.ts").as_path()));
        assert_eq!(tree.read("api/a.ts"), "import a from './a.js';\n");
        assert_eq!(tree.read("api/c.ts"), "import c from './c';\n");
        assert!(!reporter.finished);
    }

    #[test]
    fn test_continue_records_failure_and_keeps_going() {
        let tree = TestTree::new();
        tree.add_file("api/a.ts", "import a from './a';\n");
        tree.add_bytes("api/b.ts", &[0xFF, 0xFE, 0x00]);
        tree.add_file("api/c.ts", "import c from './c';\n");

        let config = RewriteConfig {
            on_error: ErrorPolicy::Continue,
            ..config_for(&tree)
        };
        let mut reporter = RecordingReporter::default();
        let summary = rewrite_imports_in_tree(&config, &mut reporter).unwrap();

        assert_eq!(summary.fixed.len(), 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].path, Some(tree.join("api/b.ts")));
        assert_eq!(reporter.failed.len(), 1);
        assert!(reporter.finished);
        assert_eq!(tree.read("api/c.ts"), "import c from './c.js';\n");
    }

    #[test]
    fn test_second_run_fixes_nothing() {
        let tree = TestTree::new();
        tree.add_file("api/a.ts", "import a from './a';\nimport b from '../b';\n");

        let mut reporter = RecordingReporter::default();
        let first = rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap();
        assert_eq!(first.imports_rewritten, 2);

        let mut reporter = RecordingReporter::default();
        let second = rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap();
        assert!(second.fixed.is_empty());
        assert!(reporter.fixed.is_empty());
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let tree = TestTree::new();
        tree.add_file("api/a.ts", "import a from './a';\n");

        let config = RewriteConfig {
            dry_run: true,
            ..config_for(&tree)
        };
        let mut reporter = RecordingReporter::default();
        let summary = rewrite_imports_in_tree(&config, &mut reporter).unwrap();

        assert!(summary.dry_run);
        assert_eq!(reporter.fixed, vec![tree.join("api/a.ts")]);
        assert_eq!(tree.read("api/a.ts"), "import a from './a';\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_followed() {
        use std::os::unix::fs::symlink;

        let tree = TestTree::new();
        tree.add_file("api/a.ts", "import a from './a';\n");
        symlink(tree.join("api"), tree.join("api/loop")).unwrap();

        let mut reporter = RecordingReporter::default();
        let summary = rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap();

        assert_eq!(summary.scanned, 1);
        assert_eq!(reporter.fixed, vec![tree.join("api/a.ts")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_reported_as_not_found() {
        use std::os::unix::fs::symlink;

        let tree = TestTree::new();
        tree.add_file("api/real.ts", "import r from './r';\n");
        symlink(tree.join("api/gone.ts"), tree.join("api/link.ts")).unwrap();

        let mut reporter = RecordingReporter::default();
        let err = rewrite_imports_in_tree(&config_for(&tree), &mut reporter).unwrap_err();
        match err {
            RewriteError::Io { path, source } => {
                assert_eq!(path, tree.join("api/link.ts"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {:?}", other),
        }

        let config = RewriteConfig {
            on_error: ErrorPolicy::Continue,
            ..config_for(&tree)
        };
        let mut reporter = RecordingReporter::default();
        let summary = rewrite_imports_in_tree(&config, &mut reporter).unwrap();
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].path, Some(tree.join("api/link.ts")));
        assert_eq!(reporter.fixed, vec![tree.join("api/real.ts")]);
    }

    #[test]
    fn test_compile_ignore_patterns() {
        let patterns = compile_ignore_patterns(&["*.d.ts".to_string()]).unwrap();
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].matches("index.d.ts"));
        assert!(compile_ignore_patterns(&["a[".to_string()]).is_err());
    }
}
