//! Generator driver: runs one generator and folds its output into a
//! compilation.

use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
};

use serde::Serialize;

use crate::{
    CancellationToken, Cancelled, CompilationRef, Diagnostic, GeneratedSource, Generator,
    GeneratorContext, GeneratorId, SyntaxTree, cancel,
};

/// Identifier of the warning reported when a generator fails.
pub const GENERATOR_FAILED_ID: &str = "GEN8785";

/// A failure captured while a generator ran: an `Err` it returned or a
/// panic it raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorException {
    pub message: String,
    /// True if the generator panicked rather than returning an error.
    pub panicked: bool,
}

impl fmt::Display for GeneratorException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What one generator produced during one run.
#[derive(Debug, Clone)]
pub struct GeneratorRunResult {
    pub generator: GeneratorId,
    pub generated_sources: Vec<GeneratedSource>,
    pub diagnostics: Vec<Diagnostic>,
    pub exception: Option<GeneratorException>,
    /// Trees visited by an incremental generator; zero for one-shot ones.
    pub tracked_inputs: usize,
}

impl GeneratorRunResult {
    pub fn generated_trees(&self) -> impl Iterator<Item = &SyntaxTree> {
        self.generated_sources.iter().map(|s| &s.tree)
    }
}

/// Output of [`GeneratorDriver::run_and_update_compilation`].
#[derive(Debug)]
pub struct DriverOutput {
    /// The input compilation with generated trees merged in.
    pub compilation: CompilationRef,
    /// Diagnostics reported by the generator run.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs a single generator and keeps its last run result for inspection.
#[derive(Debug)]
pub struct GeneratorDriver {
    generator: Generator,
    run_result: Option<GeneratorRunResult>,
}

impl GeneratorDriver {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            run_result: None,
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// The result of the last run, if the driver has run.
    pub fn run_result(&self) -> Option<&GeneratorRunResult> {
        self.run_result.as_ref()
    }

    /// Run the generator against `compilation`.
    ///
    /// A generator that fails does not abort the caller: the failure is
    /// kept on the run result, a [`GENERATOR_FAILED_ID`] warning is
    /// reported, its partial output is dropped, and the returned
    /// compilation equals the input.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token is cancelled before or during the
    /// run.
    pub fn run_and_update_compilation(
        &mut self,
        compilation: &CompilationRef,
        cancel: &CancellationToken,
    ) -> Result<DriverOutput, Cancelled> {
        cancel::check(cancel)?;

        let id = self.generator.id();
        let mut ctx = GeneratorContext::new(&id, compilation.as_ref(), cancel);
        let mut tracked_inputs = 0;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &self.generator {
            Generator::OneShot(generator) => generator.execute(&mut ctx),
            Generator::Incremental(generator) => {
                for tree in compilation.syntax_trees() {
                    if ctx.is_cancelled() {
                        break;
                    }
                    generator.generate_for_tree(tree, &mut ctx)?;
                    tracked_inputs += 1;
                }
                generator.finalize(&mut ctx)
            }
        }));

        cancel::check(cancel)?;

        let exception = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(GeneratorException {
                message: format!("{:#}", err),
                panicked: false,
            }),
            Err(payload) => Some(GeneratorException {
                message: panic_message(payload.as_ref()),
                panicked: true,
            }),
        };

        let (sources, reported) = ctx.into_parts();
        let (generated_sources, diagnostics, updated) = match &exception {
            None => {
                let updated = if sources.is_empty() {
                    compilation.clone()
                } else {
                    compilation.add_syntax_trees(sources.iter().map(|s| s.tree.clone()).collect())
                };
                (sources, reported, updated)
            }
            Some(exception) => {
                let warning = Diagnostic::warning(
                    GENERATOR_FAILED_ID,
                    format!(
                        "Generator '{}' failed to generate source. It will not contribute to the output and compilation errors may occur as a result. Exception was '{}'",
                        id, exception.message
                    ),
                );
                (Vec::new(), vec![warning], compilation.clone())
            }
        };

        self.run_result = Some(GeneratorRunResult {
            generator: id,
            generated_sources,
            diagnostics: diagnostics.clone(),
            exception,
            tracked_inputs,
        });

        Ok(DriverOutput {
            compilation: updated,
            diagnostics,
        })
    }
}

/// Text of a panic payload raised by extension code.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use eyre::{Result, bail};

    use super::*;
    use crate::{
        Compilation, CompilationOptions, IncrementalGenerator, MetadataReference, SourceGenerator,
        TypeSymbol,
    };

    /// Compilation that only tracks its trees.
    #[derive(Debug, Default)]
    struct TreeBag {
        trees: Vec<SyntaxTree>,
        options: CompilationOptions,
    }

    impl Compilation for TreeBag {
        fn assembly_name(&self) -> &str {
            "bag"
        }

        fn syntax_trees(&self) -> &[SyntaxTree] {
            &self.trees
        }

        fn references(&self) -> &[MetadataReference] {
            &[]
        }

        fn options(&self) -> &CompilationOptions {
            &self.options
        }

        fn diagnostics(&self) -> Vec<Diagnostic> {
            Vec::new()
        }

        fn declared_types(&self) -> Vec<TypeSymbol> {
            Vec::new()
        }

        fn add_syntax_trees(&self, trees: Vec<SyntaxTree>) -> CompilationRef {
            let mut all = self.trees.clone();
            all.extend(trees);
            Arc::new(TreeBag {
                trees: all,
                options: self.options.clone(),
            })
        }
    }

    fn bag(texts: &[&str]) -> CompilationRef {
        Arc::new(TreeBag {
            trees: texts.iter().map(|t| SyntaxTree::new(None, *t)).collect(),
            ..TreeBag::default()
        })
    }

    struct Emit(&'static str);

    impl SourceGenerator for Emit {
        fn id(&self) -> GeneratorId {
            "emit".into()
        }

        fn execute(&self, ctx: &mut GeneratorContext<'_>) -> Result<()> {
            ctx.add_source(self.0, "class Generated {}")?;
            ctx.report_diagnostic(Diagnostic::info("EM0001", "emitted"));
            Ok(())
        }
    }

    struct Failing;

    impl SourceGenerator for Failing {
        fn id(&self) -> GeneratorId {
            "failing".into()
        }

        fn execute(&self, ctx: &mut GeneratorContext<'_>) -> Result<()> {
            ctx.add_source("Partial.g.cs", "class Partial {}")?;
            bail!("boom")
        }
    }

    struct Panicking;

    impl SourceGenerator for Panicking {
        fn id(&self) -> GeneratorId {
            "panicking".into()
        }

        fn execute(&self, _ctx: &mut GeneratorContext<'_>) -> Result<()> {
            unimplemented!("later")
        }
    }

    struct PerTree {
        seen: Mutex<Vec<String>>,
    }

    impl IncrementalGenerator for PerTree {
        fn id(&self) -> GeneratorId {
            "per-tree".into()
        }

        fn generate_for_tree(&self, tree: &SyntaxTree, _ctx: &mut GeneratorContext<'_>) -> Result<()> {
            self.seen.lock().unwrap().push(tree.text().to_string());
            Ok(())
        }

        fn finalize(&self, ctx: &mut GeneratorContext<'_>) -> Result<()> {
            let count = self.seen.lock().unwrap().len();
            ctx.add_source("Count.g.cs", format!("// {}", count))
        }
    }

    #[test]
    fn test_successful_run_updates_compilation() {
        let input = bag(&["class A {}"]);
        let mut driver = GeneratorDriver::new(Generator::one_shot(Emit("Generated.g.cs")));
        let output = driver
            .run_and_update_compilation(&input, &CancellationToken::new())
            .unwrap();

        assert_eq!(output.compilation.syntax_trees().len(), 2);
        assert_eq!(output.diagnostics.len(), 1);

        let run = driver.run_result().unwrap();
        assert!(run.exception.is_none());
        assert_eq!(run.generated_sources.len(), 1);
        assert_eq!(run.generated_sources[0].tree.path(), Some("emit/Generated.g.cs"));
    }

    #[test]
    fn test_empty_output_keeps_compilation() {
        struct Nothing;
        impl SourceGenerator for Nothing {
            fn id(&self) -> GeneratorId {
                "nothing".into()
            }
            fn execute(&self, _ctx: &mut GeneratorContext<'_>) -> Result<()> {
                Ok(())
            }
        }

        let input = bag(&["class A {}"]);
        let mut driver = GeneratorDriver::new(Generator::one_shot(Nothing));
        let output = driver
            .run_and_update_compilation(&input, &CancellationToken::new())
            .unwrap();
        assert!(Arc::ptr_eq(&input, &output.compilation));
    }

    #[test]
    fn test_error_is_captured() {
        let input = bag(&["class A {}"]);
        let mut driver = GeneratorDriver::new(Generator::one_shot(Failing));
        let output = driver
            .run_and_update_compilation(&input, &CancellationToken::new())
            .unwrap();

        assert_eq!(output.compilation.syntax_trees().len(), 1);
        assert_eq!(output.diagnostics[0].id, GENERATOR_FAILED_ID);

        let run = driver.run_result().unwrap();
        let exception = run.exception.as_ref().unwrap();
        assert_eq!(exception.message, "boom");
        assert!(!exception.panicked);
        assert!(run.generated_sources.is_empty());
    }

    #[test]
    fn test_panic_is_captured() {
        let input = bag(&[]);
        let mut driver = GeneratorDriver::new(Generator::one_shot(Panicking));
        let output = driver
            .run_and_update_compilation(&input, &CancellationToken::new())
            .unwrap();

        assert_eq!(output.diagnostics.len(), 1);
        let exception = driver.run_result().unwrap().exception.clone().unwrap();
        assert!(exception.panicked);
        assert!(exception.message.contains("not implemented"));
    }

    #[test]
    fn test_incremental_visits_every_tree() {
        let input = bag(&["class A {}", "class B {}"]);
        let generator = PerTree {
            seen: Mutex::new(Vec::new()),
        };
        let mut driver = GeneratorDriver::new(Generator::incremental(generator));
        let output = driver
            .run_and_update_compilation(&input, &CancellationToken::new())
            .unwrap();

        let run = driver.run_result().unwrap();
        assert_eq!(run.tracked_inputs, 2);
        assert_eq!(run.generated_sources[0].tree.text(), "// 2");
        assert_eq!(output.compilation.syntax_trees().len(), 3);
    }

    #[test]
    fn test_duplicate_hint_name_fails_generator() {
        struct Twice;
        impl SourceGenerator for Twice {
            fn id(&self) -> GeneratorId {
                "twice".into()
            }
            fn execute(&self, ctx: &mut GeneratorContext<'_>) -> Result<()> {
                ctx.add_source("A.g.cs", "")?;
                ctx.add_source("A.g.cs", "")
            }
        }

        let mut driver = GeneratorDriver::new(Generator::one_shot(Twice));
        driver
            .run_and_update_compilation(&bag(&[]), &CancellationToken::new())
            .unwrap();
        let exception = driver.run_result().unwrap().exception.clone().unwrap();
        assert!(exception.message.contains("already added"));
    }

    #[test]
    fn test_cancelled_before_run() {
        let token = CancellationToken::new();
        token.cancel();
        let mut driver = GeneratorDriver::new(Generator::one_shot(Emit("A.g.cs")));
        assert!(driver.run_and_update_compilation(&bag(&[]), &token).is_err());
        assert!(driver.run_result().is_none());
    }
}
