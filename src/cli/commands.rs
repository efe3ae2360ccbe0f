//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler;
use crate::harness::{load_artifact, HarnessConfig, ScenarioRunner};
use crate::runtime::Runtime;
use veil_format::{ClassImage, ARTIFACT_EXTENSION};

use super::{CliError, CliResult, ExitCode};

/// Run the full harness: all fixtures, sequentially, against the runtime
/// facility. Exit status is nonzero iff any fixture deviates from its
/// expected outcome.
pub fn run_harness(
    fixtures: PathBuf,
    out_dir: PathBuf,
    compiler: Option<PathBuf>,
    verbose: bool,
) -> CliResult<ExitCode> {
    let mut config = HarnessConfig::new(fixtures, out_dir);
    if let Some(compiler) = compiler {
        config = config.with_compiler(compiler);
    }

    let runner = ScenarioRunner::<Runtime>::new(config).with_verbose(verbose);
    let summary = runner.run();

    if summary.is_pass() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Per-fixture detail was already printed by the runner.
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

/// Compile one fixture source in-process and write its artifact.
pub fn compile_file(file: &Path, out_dir: &Path) -> CliResult<ExitCode> {
    let source = fs::read_to_string(file)
        .map_err(|e| CliError::failure(format!("Error reading '{}': {}", file.display(), e)))?;
    let image = compiler::compile_source(&source)
        .map_err(|e| CliError::failure(format!("{}: {}", file.display(), e)))?;
    let bytes = image
        .encode()
        .map_err(|e| CliError::failure(format!("Error encoding '{}': {}", image.name, e)))?;

    fs::create_dir_all(out_dir)
        .map_err(|e| CliError::failure(format!("Error creating '{}': {}", out_dir.display(), e)))?;
    let artifact = out_dir.join(format!("{}.{}", image.name, ARTIFACT_EXTENSION));
    fs::write(&artifact, bytes)
        .map_err(|e| CliError::failure(format!("Error writing '{}': {}", artifact.display(), e)))?;

    println!("{}", artifact.display());
    Ok(ExitCode::SUCCESS)
}

/// Decode an artifact and print its class shape.
pub fn inspect_artifact(path: &Path) -> CliResult<ExitCode> {
    let bytes = load_artifact(path)
        .map_err(|e| CliError::failure(format!("Error reading '{}': {}", path.display(), e)))?;
    let image = ClassImage::decode(&bytes)
        .map_err(|e| CliError::failure(format!("'{}': {}", path.display(), e)))?;

    println!("class {}", image.name);
    for field in &image.fields {
        match image.type_ref(field.ty) {
            Some(ty) => println!("  field {}: {}", field.name, ty),
            None => println!("  field {}: <bad index {}>", field.name, field.ty),
        }
    }
    for method in &image.methods {
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| match image.type_ref(*p) {
                Some(ty) => ty.to_string(),
                None => format!("<bad index {}>", p),
            })
            .collect();
        let ret = match image.type_ref(method.ret) {
            Some(ty) => ty.to_string(),
            None => format!("<bad index {}>", method.ret),
        };
        println!("  method {}({}) -> {}", method.name, params.join(", "), ret);
    }
    Ok(ExitCode::SUCCESS)
}
