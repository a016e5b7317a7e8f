//! Analyze phase - runs the configured analyzers.

use crate::{
    Result,
    pipeline::{Phase, RunContext},
};

/// Phase that collects analyzer diagnostics from the assembled compilation.
///
/// With no analyzers configured the front end is not asked to analyze at
/// all and the analyzer diagnostics stay empty.
pub struct AnalyzePhase;

impl Phase for AnalyzePhase {
    fn name(&self) -> &'static str {
        "analyze"
    }

    fn description(&self) -> &'static str {
        "Run analyzers against the compilation"
    }

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<()> {
        let analyzers = ctx.configuration.analyzers();
        if analyzers.is_empty() {
            return Ok(());
        }

        let compilation = ctx.require_compilation(self.name())?;
        let diagnostics = ctx
            .configuration
            .front_end()
            .analyze(compilation, analyzers, ctx.cancel)?;
        ctx.analyzer_diagnostics = diagnostics;
        Ok(())
    }
}
