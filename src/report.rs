//! Run summaries and the reporters that print them
//!
//! Fixed-file notices go to stdout, one `Fixed: <path>` line per rewritten
//! file. Failures and the closing summary line go to stderr so stdout stays
//! a plain list of paths.

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// A file whose imports were rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixedFile {
    pub path: PathBuf,
    pub imports: usize,
}

/// A file or directory that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub error: String,
}

/// Totals for one run over a tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    /// Files that matched a suffix and were read
    pub scanned: usize,
    pub imports_rewritten: usize,
    pub fixed: Vec<FixedFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn record_fixed(&mut self, file: FixedFile) {
        self.imports_rewritten += file.imports;
        self.fixed.push(file);
    }

    pub fn record_failure(&mut self, failure: FileFailure) {
        self.failures.push(failure);
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One-line human summary, e.g. `2 files fixed, 3 imports rewritten (10 scanned)`.
    pub fn summary_line(&self) -> String {
        let verb = if self.dry_run { "would be fixed" } else { "fixed" };
        let mut line = format!(
            "{} {} {}, {} {} rewritten ({} scanned)",
            self.fixed.len(),
            plural(self.fixed.len(), "file", "files"),
            verb,
            self.imports_rewritten,
            plural(self.imports_rewritten, "import", "imports"),
            self.scanned,
        );
        if self.has_failures() {
            line.push_str(&format!(
                ", {} {}",
                self.failures.len(),
                plural(self.failures.len(), "failure", "failures")
            ));
        }
        line
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

/// Receives events while a tree is being rewritten.
pub trait Reporter {
    fn file_fixed(&mut self, file: &FixedFile) -> io::Result<()>;

    fn file_failed(&mut self, failure: &FileFailure) -> io::Result<()>;

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Human-readable output for terminals.
pub struct ConsoleReporter<W: WriteColor = StandardStream> {
    out: W,
    err: W,
    dry_run: bool,
    quiet: bool,
}

impl ConsoleReporter<StandardStream> {
    pub fn new(use_color: bool, dry_run: bool, quiet: bool) -> Self {
        let choice = if use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::with_writers(
            StandardStream::stdout(choice),
            StandardStream::stderr(choice),
            dry_run,
            quiet,
        )
    }
}

impl<W: WriteColor> ConsoleReporter<W> {
    pub fn with_writers(out: W, err: W, dry_run: bool, quiet: bool) -> Self {
        Self {
            out,
            err,
            dry_run,
            quiet,
        }
    }

    /// Consume the reporter, returning its (stdout, stderr) writers.
    pub fn into_writers(self) -> (W, W) {
        (self.out, self.err)
    }
}

impl<W: WriteColor> Reporter for ConsoleReporter<W> {
    fn file_fixed(&mut self, file: &FixedFile) -> io::Result<()> {
        let label = if self.dry_run { "Would fix:" } else { "Fixed:" };
        self.out
            .set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(self.out, "{}", label)?;
        self.out.reset()?;
        writeln!(self.out, " {}", file.path.display())
    }

    fn file_failed(&mut self, failure: &FileFailure) -> io::Result<()> {
        self.err
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(self.err, "error:")?;
        self.err.reset()?;
        writeln!(self.err, " {}", failure.error)
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.out.flush()?;
        if self.quiet {
            return Ok(());
        }
        self.err
            .set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(self.err, "{}", summary.summary_line())?;
        self.err.reset()
    }
}

/// Machine-readable output: nothing while walking, the summary as JSON at the end.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn file_fixed(&mut self, _file: &FixedFile) -> io::Result<()> {
        Ok(())
    }

    fn file_failed(&mut self, _failure: &FileFailure) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
        writeln!(self.out, "{}", json)?;
        self.out.flush()
    }
}
