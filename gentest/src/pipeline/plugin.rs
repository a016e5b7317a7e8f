//! Pipeline plugin trait.

use super::RunContext;
use crate::Result;

/// A plugin that observes a test run.
///
/// Plugins receive callbacks before and after each phase. They see the run
/// context but cannot change it, so a plugin never affects the result.
///
/// # Example
///
/// ```ignore
/// struct TimingPlugin {
///     start_times: Mutex<HashMap<&'static str, Instant>>,
/// }
///
/// impl Plugin for TimingPlugin {
///     fn name(&self) -> &'static str { "timing" }
///
///     fn on_before_phase(&self, phase: &'static str, _ctx: &RunContext<'_>) -> Result<()> {
///         self.start_times.lock().unwrap().insert(phase, Instant::now());
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// The name of this plugin.
    fn name(&self) -> &'static str;

    /// Called before a phase runs.
    ///
    /// # Errors
    ///
    /// Return an error to abort the run.
    #[allow(unused_variables)]
    fn on_before_phase(&self, phase: &'static str, ctx: &RunContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called after a phase completes successfully.
    ///
    /// # Errors
    ///
    /// Return an error to abort the run.
    #[allow(unused_variables)]
    fn on_after_phase(&self, phase: &'static str, ctx: &RunContext<'_>) -> Result<()> {
        Ok(())
    }
}
