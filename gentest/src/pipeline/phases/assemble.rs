//! Assemble phase - builds the compilation snapshot.

use crate::{
    Result,
    pipeline::{Phase, RunContext},
};

/// Phase that assembles the parsed trees into one compilation.
///
/// Never fails on bad source: parse and binding problems are diagnostics
/// of the compilation.
pub struct AssemblePhase;

impl Phase for AssemblePhase {
    fn name(&self) -> &'static str {
        "assemble"
    }

    fn description(&self) -> &'static str {
        "Assemble the compilation"
    }

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<()> {
        let config = ctx.configuration;
        ctx.compilation = Some(config.front_end().create_compilation(
            config.assembly_name(),
            ctx.syntax_trees.clone(),
            config.references().to_vec(),
            config.compilation_options().clone(),
        ));
        Ok(())
    }
}
