//! Run context passed through pipeline phases.

use gentest_sdk::{
    CancellationToken, CompilationRef, Diagnostic, GeneratorDriver, GeneratorId, SyntaxTree,
};
use indexmap::IndexMap;

use crate::{Error, Result, TestConfiguration, TestResult, source::SourceFragment};

/// State of one test run.
///
/// The inputs borrow from the test case being run. Each phase fills in its
/// own outputs; nothing is filtered until the aggregate phase builds the
/// [`TestResult`].
#[derive(Debug)]
pub struct RunContext<'a> {
    pub configuration: &'a TestConfiguration,
    pub cancel: &'a CancellationToken,
    pub imports: &'a [String],
    pub namespace: Option<&'a str>,
    pub fragments: &'a [SourceFragment],
    /// Decorated and parsed fragments (populated by the decorate phase).
    pub syntax_trees: Vec<SyntaxTree>,
    /// The current compilation. Set by the assemble phase and replaced by
    /// the generate phase with the fully generated one.
    pub compilation: Option<CompilationRef>,
    pub analyzer_diagnostics: Vec<Diagnostic>,
    /// Drivers in run order, keyed by generator id.
    pub generator_drivers: IndexMap<GeneratorId, GeneratorDriver>,
    pub generator_diagnostics: Vec<Diagnostic>,
    pub final_diagnostics: Vec<Diagnostic>,
    /// The packaged result (populated by the aggregate phase).
    pub result: Option<TestResult>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        configuration: &'a TestConfiguration,
        cancel: &'a CancellationToken,
        imports: &'a [String],
        namespace: Option<&'a str>,
        fragments: &'a [SourceFragment],
    ) -> Self {
        Self {
            configuration,
            cancel,
            imports,
            namespace,
            fragments,
            syntax_trees: Vec::new(),
            compilation: None,
            analyzer_diagnostics: Vec::new(),
            generator_drivers: IndexMap::new(),
            generator_diagnostics: Vec::new(),
            final_diagnostics: Vec::new(),
            result: None,
        }
    }

    /// The current compilation, or an error naming the phase that needed it.
    pub fn require_compilation(&self, phase: &'static str) -> Result<&CompilationRef> {
        self.compilation
            .as_ref()
            .ok_or(Error::MissingPhaseOutput { phase })
    }
}
