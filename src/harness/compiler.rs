//! External compiler invocation.
//!
//! The compiler is an opaque process: it takes a classpath, an output
//! directory, and a source file, and the only structured output the harness
//! consumes is its exit code. Zero means the artifact was written.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use super::HarnessConfig;

/// A failed compiler invocation. Compilation is deterministic in its inputs,
/// so no failure here is worth retrying.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("compiler exited with status {exit_code}")]
    Failed { exit_code: i32 },
    #[error("failed to launch compiler '{command}': {source}")]
    Launch {
        command: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Invokes the external compiler on one source file and waits for it.
#[derive(Debug)]
pub struct ArtifactCompiler {
    command: PathBuf,
    classpath: PathBuf,
}

impl ArtifactCompiler {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            command: config.compiler.clone(),
            classpath: config.out_dir.clone(),
        }
    }

    /// Compile `source`, writing the artifact into `out_dir`.
    ///
    /// Blocks until the compiler process terminates. There is no timeout: a
    /// hung compiler hangs the harness.
    #[tracing::instrument(skip_all, fields(source = %source.display()))]
    pub fn compile(&self, source: &Path, out_dir: &Path) -> Result<(), BuildError> {
        std::fs::create_dir_all(out_dir).map_err(|e| BuildError::OutputDir {
            path: out_dir.to_path_buf(),
            source: e,
        })?;

        let output = Command::new(&self.command)
            .arg("--classpath")
            .arg(&self.classpath)
            .arg("-d")
            .arg(out_dir)
            .arg(source)
            .output()
            .map_err(|e| BuildError::Launch {
                command: self.command.clone(),
                source: e,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            tracing::debug!(
                stderr = %String::from_utf8_lossy(&output.stderr),
                "compiler failed"
            );
            Err(BuildError::Failed {
                // A signal-terminated compiler has no exit code; report -1.
                exit_code: output.status.code().unwrap_or(-1),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritable_output_directory_is_not_a_launch_failure() {
        let blocker = std::env::temp_dir().join(format!(
            "classveil_outdir_blocker_{}",
            std::process::id()
        ));
        std::fs::write(&blocker, b"not a directory").unwrap();

        let config = HarnessConfig::new("fixtures/nonfindable", std::env::temp_dir())
            .with_compiler("/nonexistent/veilc-binary");
        let compiler = ArtifactCompiler::new(&config);
        // create_dir_all cannot make a directory out of an existing file.
        let err = compiler
            .compile(Path::new("NonFindable.vc"), &blocker.join("out"))
            .unwrap_err();
        assert!(matches!(err, BuildError::OutputDir { .. }));
        assert!(err.to_string().contains("output directory"));

        let _ = std::fs::remove_file(&blocker);
    }

    #[test]
    fn launch_failure_is_not_an_exit_code() {
        let config = HarnessConfig::new("fixtures/nonfindable", std::env::temp_dir())
            .with_compiler("/nonexistent/veilc-binary");
        let compiler = ArtifactCompiler::new(&config);
        let err = compiler
            .compile(Path::new("NonFindable.vc"), &std::env::temp_dir())
            .unwrap_err();
        assert!(matches!(err, BuildError::Launch { .. }));
    }
}
