//! Test cases: code plus configuration, with a history of runs.

use std::sync::Arc;

use gentest_sdk::CancellationToken;
use tracing::Dispatch;

use crate::{
    Error, LoggingOptions, Result, TestConfiguration, TestResult,
    observe::ObservabilityPlugin,
    pipeline::{Pipeline, RunContext},
    source::SourceFragment,
};

/// A test case.
///
/// Every `with_*` method returns a new value. Running a case returns a new
/// case with the result appended to its history, so one case can be run
/// several times while keeping earlier outcomes.
///
/// # Example
///
/// ```ignore
/// let case = TestCase::new(config)
///     .with_added_namespace_imports(["System"])
///     .in_namespace("App")
///     .with_code("class Foo : Attribute {}");
///
/// let (case, result) = case.run(&CancellationToken::new(), None, LoggingOptions::NONE)?;
/// assert!(result.final_diagnostics().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TestCase {
    configuration: TestConfiguration,
    namespace_imports: Vec<String>,
    namespace: Option<String>,
    fragments: Vec<SourceFragment>,
    results: Vec<Arc<TestResult>>,
}

impl TestCase {
    pub fn new(configuration: TestConfiguration) -> Self {
        Self {
            configuration,
            namespace_imports: Vec::new(),
            namespace: None,
            fragments: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Append a fragment without a path.
    pub fn with_code(&self, code: impl Into<String>) -> Self {
        self.with_fragment(SourceFragment::new(code))
    }

    pub fn with_fragment(&self, fragment: SourceFragment) -> Self {
        let mut next = self.clone();
        next.fragments.push(fragment);
        next
    }

    pub fn with_configuration(&self, configuration: TestConfiguration) -> Self {
        Self {
            configuration,
            ..self.clone()
        }
    }

    /// Derive a new configuration from the current one.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let case = case.configure(|config| {
    ///     config.with_additional_generators([Arc::new(MyGenerator) as _])
    /// })?;
    /// ```
    pub fn configure<F>(&self, configure: F) -> Result<Self>
    where
        F: FnOnce(&TestConfiguration) -> Result<TestConfiguration>,
    {
        Ok(self.with_configuration(configure(&self.configuration)?))
    }

    pub fn with_added_namespace_imports<I, S>(&self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.namespace_imports
            .extend(imports.into_iter().map(Into::into));
        next
    }

    /// Wrap every fragment in a file-scoped namespace.
    pub fn in_namespace(&self, namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..self.clone()
        }
    }

    pub fn configuration(&self) -> &TestConfiguration {
        &self.configuration
    }

    pub fn namespace_imports(&self) -> &[String] {
        &self.namespace_imports
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn fragments(&self) -> &[SourceFragment] {
        &self.fragments
    }

    /// Every result, oldest first.
    pub fn results(&self) -> &[Arc<TestResult>] {
        &self.results
    }

    /// The only result of a case that ran exactly once.
    ///
    /// # Errors
    ///
    /// [`Error::NoResults`] before the first run, [`Error::MultipleResults`]
    /// after the second.
    pub fn result(&self) -> Result<&Arc<TestResult>> {
        match self.results.as_slice() {
            [] => Err(Error::NoResults),
            [result] => Ok(result),
            results => Err(Error::MultipleResults {
                count: results.len(),
            }),
        }
    }

    pub fn latest_result(&self) -> Option<&Arc<TestResult>> {
        self.results.last()
    }

    /// Run the pipeline.
    ///
    /// With a `log` dispatcher the run executes under it and logs what
    /// `logging` selects. Without one, nothing is logged and no logging
    /// code runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if `cancel` is triggered before the run
    /// completes. The case is left as it was.
    pub fn run(
        &self,
        cancel: &CancellationToken,
        log: Option<&Dispatch>,
        logging: LoggingOptions,
    ) -> Result<(TestCase, Arc<TestResult>)> {
        let result = match log {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || {
                let pipeline = Pipeline::new().plugin(ObservabilityPlugin::new(logging));
                self.run_pipeline(&pipeline, cancel)
            })?,
            None => self.run_pipeline(&Pipeline::new(), cancel)?,
        };

        let result = Arc::new(result);
        let mut next = self.clone();
        next.results.push(result.clone());
        Ok((next, result))
    }

    fn run_pipeline(&self, pipeline: &Pipeline, cancel: &CancellationToken) -> Result<TestResult> {
        let mut ctx = RunContext::new(
            &self.configuration,
            cancel,
            &self.namespace_imports,
            self.namespace.as_deref(),
            &self.fragments,
        );
        pipeline.run(&mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use gentest_minics::{MiniCs, core_library};

    use super::*;

    fn case() -> TestCase {
        TestCase::new(TestConfiguration::new(MiniCs::shared(), vec![core_library()]))
    }

    #[test]
    fn test_builders_do_not_mutate() {
        let base = case();
        let derived = base
            .with_code("class A {}")
            .with_added_namespace_imports(["System"])
            .in_namespace("App");

        assert!(base.fragments().is_empty());
        assert!(base.namespace().is_none());
        assert_eq!(derived.fragments().len(), 1);
        assert_eq!(derived.namespace_imports(), ["System".to_string()]);
        assert_eq!(derived.namespace(), Some("App"));
    }

    #[test]
    fn test_result_history() {
        let case = case().with_code("class A {}");
        assert!(matches!(case.result(), Err(Error::NoResults)));

        let cancel = CancellationToken::new();
        let (once, first) = case.run(&cancel, None, LoggingOptions::NONE).unwrap();
        assert!(Arc::ptr_eq(once.result().unwrap(), &first));
        assert!(case.results().is_empty());

        let (twice, second) = once.run(&cancel, None, LoggingOptions::NONE).unwrap();
        assert!(matches!(
            twice.result(),
            Err(Error::MultipleResults { count: 2 })
        ));
        assert_eq!(twice.results().len(), 2);
        assert!(Arc::ptr_eq(twice.latest_result().unwrap(), &second));
        assert_eq!(first.summary(), second.summary());
    }

    #[test]
    fn test_cancelled_run_leaves_history() {
        let case = case().with_code("class A {}");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = case.run(&cancel, None, LoggingOptions::ALL).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(case.results().is_empty());
    }

    #[test]
    fn test_configure() {
        let case = case()
            .configure(|config| Ok(config.with_assembly_name("Configured")))
            .unwrap();
        assert_eq!(case.configuration().assembly_name(), "Configured");
    }
}
