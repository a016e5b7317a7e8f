//! Assertion helpers for analyzer and generator tests.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::sync::Arc;

use gentest_sdk::{
    CancellationToken, Compilation, Diagnostic, GeneratorId, GeneratorRunResult, SyntaxTree,
};
use tracing::{Dispatch, error, info};

use crate::{
    Error, LoggingOptions, Stage, TestCase, TestResult,
    filter::{self, DiagnosticFilter},
    format::{format_diagnostics, ids_string, short_file_name, tree_list},
    observe::log_tree,
};

/// A failed assertion. `Display` is the failure text.
#[derive(Debug, thiserror::Error)]
pub enum AssertionError {
    #[error("expected diagnostic id {expected} is not among received diagnostics {received}")]
    MissingDiagnostic { expected: String, received: String },

    #[error("generator '{generator}' generated no trees")]
    NothingGenerated { generator: GeneratorId },

    #[error("generator '{generator}' generated no matching tree among:\n{trees}")]
    NoMatchingTree { generator: GeneratorId, trees: String },

    #[error("compilation failed:\n{diagnostics}")]
    CompilationFailed { diagnostics: String },

    #[error("generator '{generator}' did not run")]
    MissingGenerator { generator: GeneratorId },

    #[error("expected file '{file}' was not generated, generated files:\n{generated}")]
    FileNotGenerated { file: String, generated: String },

    #[error("generator '{generator}' threw: {message}")]
    GeneratorThrew {
        generator: GeneratorId,
        message: String,
    },

    #[error("{stage} reported {count} unexpected diagnostics:\n{diagnostics}")]
    UnexpectedDiagnostics {
        stage: Stage,
        count: usize,
        diagnostics: String,
    },

    #[error("expected {expected} generator results, got {actual}")]
    ResultCount { expected: usize, actual: usize },

    #[error(transparent)]
    Harness(#[from] Error),
}

/// Check that every id in `expected` appears in `diagnostics`.
pub fn assert_diagnostics_contain<I, S>(
    diagnostics: &[Diagnostic],
    expected: I,
) -> Result<(), AssertionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for id in expected {
        let id = id.as_ref();
        if !diagnostics.iter().any(|d| d.id == id) {
            return Err(AssertionError::MissingDiagnostic {
                expected: id.to_string(),
                received: ids_string(diagnostics),
            });
        }
    }
    Ok(())
}

pub fn assert_generated_any(run: &GeneratorRunResult) -> Result<(), AssertionError> {
    if run.generated_sources.is_empty() {
        return Err(AssertionError::NothingGenerated {
            generator: run.generator.clone(),
        });
    }
    Ok(())
}

pub fn assert_generated_any_matching<P>(
    run: &GeneratorRunResult,
    predicate: P,
) -> Result<(), AssertionError>
where
    P: Fn(&SyntaxTree) -> bool,
{
    if run.generated_trees().any(predicate) {
        return Ok(());
    }
    Err(AssertionError::NoMatchingTree {
        generator: run.generator.clone(),
        trees: tree_list(run.generated_trees(), 1).unwrap_or_else(|| "\tnone".to_string()),
    })
}

/// Check that `compilation` emits. Emit diagnostics are logged on failure.
pub fn assert_compiles(compilation: &dyn Compilation) -> Result<(), AssertionError> {
    let emit = compilation.emit();
    if emit.success {
        return Ok(());
    }

    let diagnostics = format_diagnostics(&emit.diagnostics);
    error!("compilation failed:\n{}", diagnostics);
    Err(AssertionError::CompilationFailed { diagnostics })
}

/// A test case focused on one generator.
///
/// Every `test_*` method runs the case once and returns the result so
/// callers can assert further.
///
/// # Example
///
/// ```ignore
/// let test = GeneratorTest::new(case, "my_generator").with_log(dispatch);
/// test.test_generator_throws_no_exception()?;
/// test.test_generates_file("Foo.g.cs")?;
/// ```
#[derive(Debug, Clone)]
pub struct GeneratorTest {
    case: TestCase,
    generator: GeneratorId,
    log: Option<Dispatch>,
    cancel: CancellationToken,
}

impl GeneratorTest {
    pub fn new(case: TestCase, generator: impl Into<GeneratorId>) -> Self {
        Self {
            case,
            generator: generator.into(),
            log: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Run under `dispatch`, logging what each test selects.
    pub fn with_log(mut self, dispatch: Dispatch) -> Self {
        self.log = Some(dispatch);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn case(&self) -> &TestCase {
        &self.case
    }

    pub fn generator(&self) -> &GeneratorId {
        &self.generator
    }

    pub fn run_code_test(&self, logging: LoggingOptions) -> Result<Arc<TestResult>, AssertionError> {
        self.run_case(&self.case, logging)
    }

    /// Run a case derived from this one.
    pub fn run_configured<F>(
        &self,
        logging: LoggingOptions,
        configure: F,
    ) -> Result<Arc<TestResult>, AssertionError>
    where
        F: FnOnce(&TestCase) -> crate::Result<TestCase>,
    {
        let case = configure(&self.case)?;
        self.run_case(&case, logging)
    }

    pub fn test_generator_runs(&self) -> Result<Arc<TestResult>, AssertionError> {
        let result = self.run_code_test(LoggingOptions::ALL)?;
        if !result.generator_results().contains_key(&self.generator) {
            return Err(AssertionError::MissingGenerator {
                generator: self.generator.clone(),
            });
        }
        Ok(result)
    }

    pub fn test_generates_any_trees(&self) -> Result<Arc<TestResult>, AssertionError> {
        let result = self.run_code_test(LoggingOptions::ALL)?;
        assert_generated_any(self.target_run(&result)?)?;
        Ok(result)
    }

    /// Final compilation diagnostics, hidden ones excluded, must be empty.
    pub fn test_final_compilation_reports_no_diagnostics(
        &self,
    ) -> Result<Arc<TestResult>, AssertionError> {
        self.test_final_compilation_reports_no_diagnostics_matching(filter::not_hidden())
    }

    /// Final compilation diagnostics accepted by `filter` must be empty.
    ///
    /// The generated trees the offending diagnostics point into are logged.
    pub fn test_final_compilation_reports_no_diagnostics_matching(
        &self,
        filter: DiagnosticFilter,
    ) -> Result<Arc<TestResult>, AssertionError> {
        let result = self.run_code_test(LoggingOptions::FINAL_DIAGNOSTICS)?;
        let diagnostics: Vec<Diagnostic> = result
            .compilation()
            .diagnostics()
            .into_iter()
            .filter(|d| filter(d))
            .collect();

        if diagnostics.is_empty() {
            return Ok(result);
        }

        self.logged(|| log_diagnostic_trees(&result, &diagnostics));
        Err(AssertionError::UnexpectedDiagnostics {
            stage: Stage::Final,
            count: diagnostics.len(),
            diagnostics: format_diagnostics(&diagnostics),
        })
    }

    /// The target generator must produce a tree named `short_name`.
    ///
    /// Diagnostics located in other files are filtered out of the run.
    pub fn test_generates_file(&self, short_name: &str) -> Result<Arc<TestResult>, AssertionError> {
        let result = self.run_configured(LoggingOptions::DIAGNOSTICS, |case| {
            case.configure(|config| {
                Ok(config.with_additional_diagnostic_filters([filter::in_file(short_name)]))
            })
        })?;

        let run = self.target_run(&result)?;
        let Some(tree) = run
            .generated_trees()
            .find(|tree| tree.path().and_then(short_file_name) == Some(short_name))
        else {
            return Err(AssertionError::FileNotGenerated {
                file: short_name.to_string(),
                generated: tree_list(run.generated_trees(), 1)
                    .unwrap_or_else(|| "\tnone".to_string()),
            });
        };

        self.logged(|| {
            log_tree(tree, "Generated code");
            info!("Full file path is '{}'", tree.file_path());
        });
        Ok(result)
    }

    /// Exactly one generator must have run. Its trees are logged.
    pub fn test_generator_has_result(&self) -> Result<Arc<TestResult>, AssertionError> {
        let result = self.run_code_test(LoggingOptions::NONE)?;
        let actual = result.generator_results().len();
        if actual != 1 {
            return Err(AssertionError::ResultCount {
                expected: 1,
                actual,
            });
        }

        let run = self.target_run(&result)?;
        self.logged(|| {
            let trees: Vec<&str> = run.generated_trees().map(SyntaxTree::text).collect();
            info!("Generated trees:\n{}", trees.join("\n"));
        });
        Ok(result)
    }

    pub fn test_generator_throws_no_exception(&self) -> Result<Arc<TestResult>, AssertionError> {
        let result = self.run_code_test(LoggingOptions::NONE)?;
        if let Some(exception) = &self.target_run(&result)?.exception {
            return Err(AssertionError::GeneratorThrew {
                generator: self.generator.clone(),
                message: exception.message.clone(),
            });
        }
        Ok(result)
    }

    pub fn test_generator_reports_no_diagnostics(
        &self,
    ) -> Result<Arc<TestResult>, AssertionError> {
        let result = self.run_code_test(LoggingOptions::GENERATOR_DIAGNOSTICS)?;
        let diagnostics = &self.target_run(&result)?.diagnostics;
        if !diagnostics.is_empty() {
            return Err(AssertionError::UnexpectedDiagnostics {
                stage: Stage::Generator,
                count: diagnostics.len(),
                diagnostics: format_diagnostics(diagnostics),
            });
        }
        Ok(result)
    }

    pub fn test_generator_reports_diagnostics<I, S>(
        &self,
        ids: I,
    ) -> Result<Arc<TestResult>, AssertionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = self.run_code_test(LoggingOptions::GENERATOR_DIAGNOSTICS)?;
        assert_diagnostics_contain(&self.target_run(&result)?.diagnostics, ids)?;
        Ok(result)
    }

    fn run_case(
        &self,
        case: &TestCase,
        logging: LoggingOptions,
    ) -> Result<Arc<TestResult>, AssertionError> {
        let (_, result) = case.run(&self.cancel, self.log.as_ref(), logging)?;
        Ok(result)
    }

    fn target_run<'r>(
        &self,
        result: &'r TestResult,
    ) -> Result<&'r GeneratorRunResult, AssertionError> {
        result.run_result(&self.generator).map_err(|err| match err {
            Error::UnknownGenerator { .. } => AssertionError::MissingGenerator {
                generator: self.generator.clone(),
            },
            other => other.into(),
        })
    }

    fn logged(&self, f: impl FnOnce()) {
        if let Some(dispatch) = &self.log {
            tracing::dispatcher::with_default(dispatch, f);
        }
    }
}

/// Log every generated tree one of `diagnostics` points into.
fn log_diagnostic_trees(result: &TestResult, diagnostics: &[Diagnostic]) {
    let mut paths: Vec<&str> = diagnostics
        .iter()
        .filter_map(|d| d.location.path.as_deref())
        .collect();
    paths.sort_unstable();
    paths.dedup();

    for path in paths {
        for tree in result.generated_trees().filter(|t| t.path() == Some(path)) {
            log_tree(tree, "Generated code");
        }
    }
}
