//! Compiler front end, analyzer and generator interfaces for gentest.
//!
//! This crate is the boundary between the test harness and a compiler. It
//! defines what a harness needs from a compiler and nothing more:
//!
//! - [`FrontEnd`] - parses text and assembles [`Compilation`] snapshots
//! - [`Analyzer`] - static analysis reporting [`Diagnostic`]s
//! - [`SourceGenerator`] / [`IncrementalGenerator`] - code generation
//! - [`GeneratorDriver`] - runs one generator and folds its output into a
//!   compilation
//!
//! Cancellation is cooperative through [`CancellationToken`].

mod analyzer;
pub mod cancel;
mod compilation;
mod diagnostic;
mod driver;
mod generator;
mod options;
mod reference;
mod syntax;

pub use analyzer::Analyzer;
pub use cancel::{CancellationToken, Cancelled};
pub use compilation::{Compilation, CompilationRef, EmitResult, FrontEnd, TypeSymbol};
pub use diagnostic::{Diagnostic, LinePosition, LineSpan, Location, Severity};
pub use driver::{
    DriverOutput, GENERATOR_FAILED_ID, GeneratorDriver, GeneratorException, GeneratorRunResult,
};
pub use generator::{
    GeneratedSource, Generator, GeneratorContext, GeneratorId, GeneratorKind, IncrementalGenerator,
    SourceGenerator,
};
pub use options::{CompilationOptions, OutputKind};
pub use reference::{MetadataReference, NamespaceExports, ReferenceError};
pub use syntax::SyntaxTree;
