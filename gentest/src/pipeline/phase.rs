//! Pipeline phase trait.

use super::RunContext;
use crate::Result;

/// Information about a pipeline phase.
#[derive(Debug, Clone)]
pub struct PhaseInfo {
    /// The phase name.
    pub name: &'static str,
    /// A human-readable description.
    pub description: &'static str,
}

/// A phase of a test run.
///
/// Phases run strictly in order, each reading the outputs of the ones
/// before it from the [`RunContext`].
pub trait Phase: Send + Sync {
    /// The name of this phase (passed to plugin hooks).
    fn name(&self) -> &'static str;

    /// A human-readable description of what this phase does.
    fn description(&self) -> &'static str;

    /// Run this phase on the run context.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot continue. Compiler, analyzer and
    /// generator problems are diagnostics, not errors.
    fn run(&self, ctx: &mut RunContext<'_>) -> Result<()>;

    /// Get information about this phase.
    fn info(&self) -> PhaseInfo {
        PhaseInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}
