//! CLI entry point for esmfix

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use esmfix::config::{DEFAULT_EXCLUDED_PREFIX, DEFAULT_EXTENSION, DEFAULT_ROOT, DEFAULT_SUFFIX};
use esmfix::{
    ConsoleReporter, ErrorPolicy, JsonReporter, Reporter, RewriteConfig, RunSummary,
    rewrite_imports_in_tree,
};
use tracing_subscriber::EnvFilter;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "esmfix")]
#[command(about = "Append explicit .js extensions to relative imports in TypeScript files")]
#[command(version)]
struct Args {
    /// Directory to scan
    #[arg(default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// File name suffix to scan (can be used multiple times)
    #[arg(short = 's', long = "suffix", value_name = "SUFFIX", default_value = DEFAULT_SUFFIX)]
    suffixes: Vec<String>,

    /// Extension appended to relative import paths
    #[arg(short = 'e', long = "extension", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Import path prefix that is never rewritten (can be used multiple times)
    #[arg(
        short = 'x',
        long = "exclude-prefix",
        value_name = "PREFIX",
        default_value = DEFAULT_EXCLUDED_PREFIX
    )]
    excluded_prefixes: Vec<String>,

    /// Skip files and directories whose name matches pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Show which files would be fixed without writing them
    #[arg(short = 'n', long = "dry-run")]
    dry_run: bool,

    /// Keep going after a file cannot be read or written, exiting non-zero at the end
    #[arg(short = 'k', long = "keep-going")]
    keep_going: bool,

    /// Print a JSON summary instead of one line per fixed file
    #[arg(long = "json")]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Do not print the summary line
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn to_config(&self) -> RewriteConfig {
        RewriteConfig {
            root: self.root.clone(),
            suffixes: self.suffixes.clone(),
            extension: self.extension.clone(),
            excluded_prefixes: self.excluded_prefixes.clone(),
            ignore_patterns: self.ignore.clone(),
            on_error: if self.keep_going {
                ErrorPolicy::Continue
            } else {
                ErrorPolicy::Abort
            },
            dry_run: self.dry_run,
        }
    }
}

fn init_tracing(verbose: u8, use_color: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(use_color)
        .init();
}

fn run(config: &RewriteConfig, reporter: &mut dyn Reporter) -> esmfix::Result<RunSummary> {
    rewrite_imports_in_tree(config, reporter)
}

fn main() {
    let args = Args::parse();
    let use_color = should_use_color(args.color);
    init_tracing(args.verbose, use_color);

    let config = args.to_config();

    let result = if args.json {
        run(&config, &mut JsonReporter::stdout())
    } else {
        run(
            &config,
            &mut ConsoleReporter::new(use_color, args.dry_run, args.quiet),
        )
    };

    match result {
        Ok(summary) if summary.has_failures() => process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("esmfix: {}", e);
            process::exit(1);
        }
    }
}
