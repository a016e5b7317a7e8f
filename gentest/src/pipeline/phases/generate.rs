//! Generate phase - runs generators in sequence.

use gentest_sdk::{GeneratorDriver, cancel};

use crate::{
    Result,
    pipeline::{Phase, RunContext},
};

/// Phase that runs every configured generator, one-shot ones first.
///
/// Each generator sees the compilation produced by the one before it. A
/// generator that fails keeps its failure on its own run result and the
/// compilation passes through unchanged; later generators still run.
pub struct GeneratePhase;

impl Phase for GeneratePhase {
    fn name(&self) -> &'static str {
        "generate"
    }

    fn description(&self) -> &'static str {
        "Run generators and fold their output into the compilation"
    }

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<()> {
        let config = ctx.configuration;
        let mut compilation = ctx.require_compilation(self.name())?.clone();

        for generator in config.generators() {
            cancel::check(ctx.cancel)?;
            let id = generator.id();
            let mut driver = GeneratorDriver::new(generator);
            let output = driver.run_and_update_compilation(&compilation, ctx.cancel)?;
            ctx.generator_diagnostics.extend(output.diagnostics);
            ctx.generator_drivers.insert(id, driver);
            compilation = output.compilation;
        }

        ctx.compilation = Some(compilation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use eyre::bail;
    use gentest_minics::{MiniCs, core_library};
    use gentest_sdk::{
        CancellationToken, CompilationOptions, Diagnostic, FrontEnd, GeneratorContext, GeneratorId,
        SourceGenerator, SyntaxTree,
    };

    use super::*;
    use crate::{Error, TestConfiguration};

    struct Emits {
        id: &'static str,
        file: &'static str,
        code: &'static str,
    }

    impl SourceGenerator for Emits {
        fn id(&self) -> GeneratorId {
            self.id.into()
        }

        fn execute(&self, ctx: &mut GeneratorContext<'_>) -> eyre::Result<()> {
            ctx.report_diagnostic(Diagnostic::info("EM0001", self.file));
            ctx.add_source(self.file, self.code)
        }
    }

    struct Throws;

    impl SourceGenerator for Throws {
        fn id(&self) -> GeneratorId {
            "throws".into()
        }

        fn execute(&self, _ctx: &mut GeneratorContext<'_>) -> eyre::Result<()> {
            bail!("not implemented")
        }
    }

    /// Cancels the run from inside a generator.
    struct Cancels(CancellationToken);

    impl SourceGenerator for Cancels {
        fn id(&self) -> GeneratorId {
            "cancels".into()
        }

        fn execute(&self, _ctx: &mut GeneratorContext<'_>) -> eyre::Result<()> {
            self.0.cancel();
            Ok(())
        }
    }

    fn run(config: &TestConfiguration, cancel: &CancellationToken) -> Result<RunContextOutput> {
        let mut ctx = RunContext::new(config, cancel, &[], None, &[]);
        ctx.compilation = Some(MiniCs.create_compilation(
            "x",
            vec![SyntaxTree::new(Some("Test.cs"), "class Test {}")],
            vec![core_library()],
            CompilationOptions::default(),
        ));
        GeneratePhase.run(&mut ctx)?;
        Ok(RunContextOutput {
            ids: ctx.generator_drivers.keys().map(|id| id.to_string()).collect(),
            diagnostics: ctx.generator_diagnostics,
            trees: ctx
                .compilation
                .map(|c| c.syntax_trees().len())
                .unwrap_or_default(),
        })
    }

    struct RunContextOutput {
        ids: Vec<String>,
        diagnostics: Vec<Diagnostic>,
        trees: usize,
    }

    fn shared(generator: impl SourceGenerator + 'static) -> Arc<dyn SourceGenerator> {
        Arc::new(generator)
    }

    fn generators(list: Vec<Arc<dyn SourceGenerator>>) -> TestConfiguration {
        TestConfiguration::new(MiniCs::shared(), vec![core_library()])
            .with_additional_generators(list)
            .unwrap()
    }

    #[test]
    fn test_compilation_is_threaded_through() {
        let config = generators(vec![
            shared(Emits {
                id: "first",
                file: "A.g.cs",
                code: "class A {}",
            }),
            shared(Emits {
                id: "second",
                file: "B.g.cs",
                code: "class B {}",
            }),
        ]);

        let output = run(&config, &CancellationToken::new()).unwrap();

        assert_eq!(output.ids, vec!["first", "second"]);
        assert_eq!(output.trees, 3);
        let messages: Vec<_> = output.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["A.g.cs", "B.g.cs"]);
    }

    #[test]
    fn test_failing_generator_does_not_stop_later_ones() {
        let config = generators(vec![
            shared(Throws),
            shared(Emits {
                id: "after",
                file: "After.g.cs",
                code: "class After {}",
            }),
        ]);

        let output = run(&config, &CancellationToken::new()).unwrap();

        assert_eq!(output.ids, vec!["throws", "after"]);
        assert_eq!(output.trees, 2);
        assert_eq!(output.diagnostics[0].id, "GEN8785");
    }

    #[test]
    fn test_cancellation_stops_before_next_generator() {
        let cancel = CancellationToken::new();
        let config = generators(vec![
            shared(Emits {
                id: "before",
                file: "Before.g.cs",
                code: "class Before {}",
            }),
            shared(Cancels(cancel.clone())),
            shared(Emits {
                id: "never",
                file: "Never.g.cs",
                code: "class Never {}",
            }),
        ]);

        assert!(matches!(run(&config, &cancel), Err(Error::Cancelled)));
    }
}
