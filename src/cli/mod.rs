//! CLI for the classveil harness
//!
//! ## Commands
//!
//! - `run` - execute the full harness over the fixture set
//! - `compile <file>` - compile one fixture source in-process (debug)
//! - `inspect <artifact>` - decode and print a compiled artifact (debug)
//!
//! ## Design
//!
//! The CLI uses clap with derive macros. Command functions return
//! `CliResult<ExitCode>` instead of calling `process::exit`; only the
//! top-level `run()` handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Verification harness for hidden (non-findable) class definition
#[derive(Parser, Debug)]
#[command(name = "classveil")]
#[command(version = VERSION)]
#[command(about = "Verification harness for hidden class definition", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full harness over the fixture set
    Run {
        /// Directory holding the fixture sources
        #[arg(long, value_name = "DIR", default_value = "fixtures/nonfindable")]
        fixtures: PathBuf,
        /// Directory compiled artifacts are written to
        #[arg(long = "out-dir", value_name = "DIR", default_value = "target/nonfindable")]
        out_dir: PathBuf,
        /// External compiler executable (default: a veilc sibling of this binary)
        #[arg(long, value_name = "PATH")]
        compiler: Option<PathBuf>,
        /// Verbose output (durations, expected-failure diagnostics)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compile one fixture source in-process (debug)
    Compile {
        /// Source file to compile
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output directory for the artifact
        #[arg(long = "out-dir", value_name = "DIR", default_value = "target/nonfindable")]
        out_dir: PathBuf,
    },

    /// Decode and print a compiled artifact (debug)
    Inspect {
        /// Artifact file to inspect
        #[arg(value_name = "FILE")]
        artifact: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Run {
            fixtures,
            out_dir,
            compiler,
            verbose,
        } => commands::run_harness(fixtures, out_dir, compiler, verbose),
        Command::Compile { file, out_dir } => commands::compile_file(&file, &out_dir),
        Command::Inspect { artifact } => commands::inspect_artifact(&artifact),
    }
}

// ============================================================================
// Tests
// ============================================================================
