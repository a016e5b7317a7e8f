//! Declarative tests for compiler analyzers and source generators.
//!
//! A [`TestCase`] pairs source fragments with a [`TestConfiguration`]. Running
//! it decorates and parses the fragments, builds a compilation, runs the
//! analyzers, folds every generator's output into the compilation in order,
//! and packages the outcome as a [`TestResult`].
//!
//! # Module Organization
//!
//! - [`pipeline`] - The phases of a run and the plugin hooks around them
//! - [`filter`] - Diagnostic filter chain and stock filters
//! - [`format`] - Rendering of code, diagnostics and tree lists
//! - [`observe`] - `tracing` output for a run
//! - [`profile`] - TOML configuration profiles
//! - [`source`] - Source fragments and decoration
//! - [`testing`] - Assertion helpers (feature-gated)
//!
//! # Example
//!
//! ```ignore
//! use gentest::{LoggingOptions, TestCase, TestConfiguration};
//! use gentest_minics::{MiniCs, core_library};
//!
//! let config = TestConfiguration::single_generator(
//!     MiniCs::shared(),
//!     vec![core_library()],
//!     Arc::new(MyGenerator),
//! );
//! let (_, result) = TestCase::new(config)
//!     .with_code("partial class Foo {}")
//!     .run(&CancellationToken::new(), None, LoggingOptions::NONE)?;
//! assert!(result.generated_file("Foo.g.cs").is_some());
//! ```

mod case;
mod config;
mod error;
pub mod filter;
pub mod format;
mod logging;
pub mod observe;
pub mod pipeline;
pub mod profile;
mod result;
pub mod source;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use case::TestCase;
pub use config::TestConfiguration;
pub use error::{Error, Result};
pub use filter::{DiagnosticFilter, FilterChain};
pub use gentest_sdk::{CancellationToken, Diagnostic, GeneratorId, Severity};
pub use logging::LoggingOptions;
pub use profile::Profile;
pub use result::{GeneratorSummary, ResultSummary, Stage, TestResult};
pub use source::SourceFragment;
