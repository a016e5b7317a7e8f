//! Built-in pipeline phases.

mod aggregate;
mod analyze;
mod assemble;
mod decorate;
mod generate;

pub use aggregate::AggregatePhase;
pub use analyze::AnalyzePhase;
pub use assemble::AssemblePhase;
pub use decorate::DecoratePhase;
pub use generate::GeneratePhase;
