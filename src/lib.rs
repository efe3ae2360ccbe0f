#![forbid(unsafe_code)]
//! classveil — a verification harness for hidden class definition
//!
//! A *hidden* class is defined straight from artifact bytes and deliberately
//! registered in no namespace, so no name-based lookup can ever find it. The
//! code that defined it still holds a live handle and can instantiate the
//! class and invoke its methods. This crate verifies two properties of that
//! feature:
//!
//! - a hidden class is usable through its handle even though it is
//!   non-findable, and
//! - a class whose own byte-level definition structurally references its own
//!   name (a field or method signature naming the class being defined) must
//!   fail to link with a name-resolution error, because that name never
//!   enters any namespace.
//!
//! The crate ships the harness (`harness`), the fixture compiler frontend
//! backing the `veilc` binary (`compiler`), the class-definition runtime the
//! harness drives (`runtime`), and the CLI (`cli`).
//!
//! ## Panic Policy
//!
//! Production code propagates errors with `Result` and `?`; `.unwrap()` and
//! `.expect()` are acceptable only in test code.

pub mod cli;
pub mod compiler;
pub mod harness;
pub mod runtime;

pub use veil_format;

pub use harness::{ArtifactCompiler, HarnessConfig, HiddenClassRegistrar, ScenarioRunner};
pub use runtime::{DefineOptions, DefinitionError, RegisteredType, Runtime};
