//! esmfix - append explicit `.js` extensions to relative TypeScript imports

pub mod config;
pub mod error;
pub mod report;
pub mod rewrite;
pub mod walker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ErrorPolicy, RewriteConfig};
pub use error::{Result, RewriteError};
pub use report::{ConsoleReporter, FileFailure, FixedFile, JsonReporter, Reporter, RunSummary};
pub use rewrite::{FileOutcome, Rewrite, rewrite_imports, rewrite_imports_in_file};
pub use walker::rewrite_imports_in_tree;
