//! Test run pipeline.
//!
//! A run goes through five phases, each finishing before the next starts:
//!
//! - decorate: add namespace imports and the wrapping namespace to every
//!   fragment, then parse it
//! - assemble: build the compilation from the trees, references and options
//! - analyze: run the configured analyzers
//! - generate: run the generators one after another, threading the
//!   compilation through them
//! - aggregate: query the final compilation, apply the filter chain and
//!   package a [`TestResult`](crate::TestResult)
//!
//! [`Plugin`]s observe the run through before/after hooks on every phase.

mod context;
mod phase;
pub mod phases;
mod plugin;
mod runner;

pub use context::RunContext;
pub use phase::{Phase, PhaseInfo};
pub use plugin::Plugin;
pub use runner::Pipeline;
