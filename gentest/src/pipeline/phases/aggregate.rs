//! Aggregate phase - packages the test result.

use std::mem;

use crate::{
    Result, TestResult,
    pipeline::{Phase, RunContext},
};

/// Phase that queries the final compilation and builds the [`TestResult`].
///
/// The filter chain is applied here, independently to the analyzer,
/// generator and final diagnostics. Per-generator run results are moved
/// into the result unfiltered.
pub struct AggregatePhase;

impl Phase for AggregatePhase {
    fn name(&self) -> &'static str {
        "aggregate"
    }

    fn description(&self) -> &'static str {
        "Collect final diagnostics and build the result"
    }

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<()> {
        let compilation = ctx.require_compilation(self.name())?.clone();
        ctx.final_diagnostics = compilation.diagnostics();

        let filters = ctx.configuration.filters();
        ctx.result = Some(TestResult::new(
            mem::take(&mut ctx.generator_drivers),
            filters.apply(&ctx.analyzer_diagnostics),
            filters.apply(&ctx.generator_diagnostics),
            filters.apply(&ctx.final_diagnostics),
            compilation,
        ));
        Ok(())
    }
}
