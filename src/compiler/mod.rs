//! Fixture compiler frontend
//!
//! Compiles `.vc` class sources into veil class artifacts. The language is
//! deliberately tiny: one class declaration, fields with type annotations,
//! and methods whose body is a single `return`. That is exactly enough to
//! express the harness fixtures — a plainly valid class, and classes whose
//! field or method signatures reference their own name.
//!
//! The `veilc` binary is a thin wrapper around [`compile_source`]. The
//! harness never calls this module in-process; it spawns `veilc` and
//! consumes only its exit code.

pub mod ast;
pub mod emit;
pub mod parse;

use thiserror::Error;
use veil_format::ClassImage;

pub use ast::{ClassDecl, FieldDecl, MethodDecl, ReturnStmt, TypeAnnotation};
pub use emit::EmitError;
pub use parse::ParseError;

/// Errors from the full source-to-image pipeline.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Compile one `.vc` source into a class image.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn compile_source(source: &str) -> Result<ClassImage, CompileError> {
    let decl = parse::parse(source)?;
    let image = emit::emit(&decl)?;
    Ok(image)
}
