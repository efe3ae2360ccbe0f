//! veilc — the fixture class compiler
//!
//! Compiles one `.vc` source into a `.vclass` artifact named after the
//! declared class. The harness drives this binary as an opaque process and
//! consumes only its exit code: 0 means the artifact was written.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use thiserror::Error;

use classveil::compiler;
use veil_format::ARTIFACT_EXTENSION;

/// Fixture class compiler for the classveil harness
#[derive(Parser, Debug)]
#[command(name = "veilc", version)]
struct Args {
    /// Directory of previously compiled artifacts. `.vc` sources have no
    /// cross-file references yet; the flag is accepted so the invocation
    /// shape stays stable when they do.
    #[arg(long = "classpath", value_name = "DIR")]
    classpath: Option<PathBuf>,

    /// Output directory for the compiled artifact
    #[arg(short = 'd', long = "out-dir", value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Source file to compile
    #[arg(value_name = "FILE")]
    source: PathBuf,
}

#[derive(Debug, Error)]
enum VeilcError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Compile {
        path: PathBuf,
        #[source]
        source: compiler::CompileError,
    },
    #[error("cannot encode class '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: veil_format::EncodeError,
    },
    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("veilc: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), VeilcError> {
    if let Some(classpath) = &args.classpath {
        tracing::debug!(classpath = %classpath.display(), "classpath accepted");
    }

    let source = fs::read_to_string(&args.source).map_err(|e| VeilcError::Read {
        path: args.source.clone(),
        source: e,
    })?;

    let image = compiler::compile_source(&source).map_err(|e| VeilcError::Compile {
        path: args.source.clone(),
        source: e,
    })?;

    let bytes = image.encode().map_err(|e| VeilcError::Encode {
        name: image.name.clone(),
        source: e,
    })?;

    fs::create_dir_all(&args.out_dir).map_err(|e| VeilcError::Write {
        path: args.out_dir.clone(),
        source: e,
    })?;
    let artifact = args
        .out_dir
        .join(format!("{}.{}", image.name, ARTIFACT_EXTENSION));
    fs::write(&artifact, bytes).map_err(|e| VeilcError::Write {
        path: artifact.clone(),
        source: e,
    })?;

    tracing::debug!(artifact = %artifact.display(), "wrote artifact");
    Ok(())
}
