use std::path::PathBuf;

use gentest_sdk::{Cancelled, GeneratorId, ReferenceError};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the harness itself.
///
/// Compilation, analysis and generation problems are never errors: they are
/// diagnostics carried by a [`TestResult`](crate::TestResult).
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("generator '{id}' is already registered")]
    #[diagnostic(
        code(gentest::duplicate_generator),
        help("each generator in a configuration needs a distinct id")
    )]
    DuplicateGenerator { id: GeneratorId },

    #[error("the test case has not been run yet")]
    #[diagnostic(code(gentest::no_results))]
    NoResults,

    #[error("the test case has {count} results, expected exactly one")]
    #[diagnostic(
        code(gentest::multiple_results),
        help("use `results()` or `latest_result()` for test cases that run more than once")
    )]
    MultipleResults { count: usize },

    #[error("the run was cancelled")]
    #[diagnostic(code(gentest::cancelled))]
    Cancelled,

    #[error("generator '{id}' is not part of this result")]
    #[diagnostic(code(gentest::unknown_generator))]
    UnknownGenerator { id: GeneratorId },

    #[error("phase '{phase}' ran before its input was produced")]
    #[diagnostic(code(gentest::missing_phase_output))]
    MissingPhaseOutput { phase: &'static str },

    #[error("failed to read profile '{path}'")]
    #[diagnostic(code(gentest::profile::io))]
    ProfileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile")]
    #[diagnostic(
        code(gentest::profile::parse),
        help("known keys are assembly_name, output_kind, warnings_as_errors and references")
    )]
    ProfileParse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reference(#[from] ReferenceError),
}

impl From<Cancelled> for Error {
    fn from(_: Cancelled) -> Self {
        Error::Cancelled
    }
}
