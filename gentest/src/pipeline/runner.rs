//! Pipeline orchestrator.

use gentest_sdk::cancel;
use tracing::trace;

use super::{
    Phase, PhaseInfo, Plugin, RunContext,
    phases::{AggregatePhase, AnalyzePhase, AssemblePhase, DecoratePhase, GeneratePhase},
};
use crate::{Error, Result, TestResult};

/// The test run pipeline.
///
/// Runs the built-in phases in order (decorate, assemble, analyze,
/// generate, aggregate) and calls plugin hooks around each of them. The
/// cancellation token is checked before every phase.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new().plugin(ObservabilityPlugin::new(LoggingOptions::ALL));
/// let mut ctx = RunContext::new(&config, &cancel, &imports, None, &fragments);
/// let result = pipeline.run(&mut ctx)?;
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Create a pipeline with the built-in phases and no plugins.
    pub fn new() -> Self {
        Self {
            phases: vec![
                Box::new(DecoratePhase),
                Box::new(AssemblePhase),
                Box::new(AnalyzePhase),
                Box::new(GeneratePhase),
                Box::new(AggregatePhase),
            ],
            plugins: Vec::new(),
        }
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// The phases, in run order.
    pub fn phases(&self) -> impl Iterator<Item = PhaseInfo> + '_ {
        self.phases.iter().map(|phase| phase.info())
    }

    /// Run every phase and return the packaged result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if cancellation is observed, or the first
    /// error a phase or plugin returns. No result is produced in either case.
    pub fn run(&self, ctx: &mut RunContext<'_>) -> Result<TestResult> {
        for phase in &self.phases {
            cancel::check(ctx.cancel)?;
            self.run_phase(phase.as_ref(), ctx)?;
        }

        ctx.result
            .take()
            .ok_or(Error::MissingPhaseOutput { phase: "aggregate" })
    }

    /// Run a single phase with plugin hooks.
    fn run_phase(&self, phase: &dyn Phase, ctx: &mut RunContext<'_>) -> Result<()> {
        let info = phase.info();
        let phase_name = info.name;
        trace!(phase = phase_name, description = info.description, "running phase");

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
