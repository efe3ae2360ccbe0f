//! The compile-load-register-verify harness
//!
//! Per fixture, the pipeline is Compile → Load → Register → check: spawn the
//! external `veilc` compiler, read the artifact bytes byte-exactly, hand them
//! to the hidden-class registrar, and compare the result against the
//! fixture's expectation. Fixtures are processed strictly sequentially and
//! independently; the only shared state is the output directory path.
//!
//! ## Modules
//!
//! - `compiler` - external compiler invocation (process boundary)
//! - `loader` - artifact loading (full read or error)
//! - `registrar` - thin proxy over the definition facility
//! - `scenario` - per-fixture orchestration and outcome aggregation

pub mod compiler;
pub mod loader;
pub mod registrar;
pub mod scenario;

use std::env;
use std::path::PathBuf;

pub use compiler::{ArtifactCompiler, BuildError};
pub use loader::load_artifact;
pub use registrar::{DefinitionFacility, HiddenClassRegistrar};
pub use scenario::{
    Fixture, FixtureVariant, HarnessSummary, ScenarioOutcome, ScenarioReport, ScenarioRunner,
    FIXTURES,
};

/// Explicit harness configuration; there is no process-wide state.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory holding the `.vc` fixture sources.
    pub src_dir: PathBuf,
    /// Directory compiled artifacts are written to (created if absent).
    pub out_dir: PathBuf,
    /// The external compiler executable.
    pub compiler: PathBuf,
}

impl HarnessConfig {
    pub fn new(src_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_dir: src_dir.into(),
            out_dir: out_dir.into(),
            compiler: default_compiler(),
        }
    }

    pub fn with_compiler(mut self, compiler: impl Into<PathBuf>) -> Self {
        self.compiler = compiler.into();
        self
    }
}

/// Locate the `veilc` compiler: a sibling of the current executable if one
/// exists, otherwise whatever `PATH` resolves.
pub fn default_compiler() -> PathBuf {
    let name = format!("veilc{}", env::consts::EXE_SUFFIX);
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join(&name);
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from(name)
}
