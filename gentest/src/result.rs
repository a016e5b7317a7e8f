//! The outcome of one test run.

use std::fmt;

use gentest_sdk::{
    CompilationRef, Diagnostic, EmitResult, GeneratorDriver, GeneratorException, GeneratorId,
    GeneratorKind, GeneratorRunResult, SyntaxTree,
};
use indexmap::IndexMap;
use serde::Serialize;

use crate::{Error, Result, format::short_file_name};

/// The pipeline stage a diagnostic view belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analyzer,
    Generator,
    /// Diagnostics of the compilation after every generator ran.
    Final,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Analyzer, Stage::Generator, Stage::Final];

    /// Name used when logging the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Analyzer => "Analyzer",
            Stage::Generator => "Generator",
            Stage::Final => "Final compilation analysis",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Everything a test run produced.
///
/// The three diagnostic views are filtered by the configuration's filter
/// chain. The per-generator drivers are not.
#[derive(Debug)]
pub struct TestResult {
    generator_results: IndexMap<GeneratorId, GeneratorDriver>,
    analyzer_diagnostics: Vec<Diagnostic>,
    generator_diagnostics: Vec<Diagnostic>,
    final_diagnostics: Vec<Diagnostic>,
    compilation: CompilationRef,
}

impl TestResult {
    pub(crate) fn new(
        generator_results: IndexMap<GeneratorId, GeneratorDriver>,
        analyzer_diagnostics: Vec<Diagnostic>,
        generator_diagnostics: Vec<Diagnostic>,
        final_diagnostics: Vec<Diagnostic>,
        compilation: CompilationRef,
    ) -> Self {
        Self {
            generator_results,
            analyzer_diagnostics,
            generator_diagnostics,
            final_diagnostics,
            compilation,
        }
    }

    pub fn diagnostics(&self, stage: Stage) -> &[Diagnostic] {
        match stage {
            Stage::Analyzer => &self.analyzer_diagnostics,
            Stage::Generator => &self.generator_diagnostics,
            Stage::Final => &self.final_diagnostics,
        }
    }

    pub fn analyzer_diagnostics(&self) -> &[Diagnostic] {
        &self.analyzer_diagnostics
    }

    /// Diagnostics of every generator, in run order.
    pub fn generator_diagnostics(&self) -> &[Diagnostic] {
        &self.generator_diagnostics
    }

    pub fn final_diagnostics(&self) -> &[Diagnostic] {
        &self.final_diagnostics
    }

    /// Analyzer, generator and final diagnostics, in that order.
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        Stage::ALL
            .into_iter()
            .flat_map(move |stage| self.diagnostics(stage))
    }

    /// Drivers keyed by generator id, in run order.
    pub fn generator_results(&self) -> &IndexMap<GeneratorId, GeneratorDriver> {
        &self.generator_results
    }

    /// The compilation after every generator ran.
    pub fn compilation(&self) -> &CompilationRef {
        &self.compilation
    }

    pub fn driver(&self, id: &GeneratorId) -> Result<&GeneratorDriver> {
        self.generator_results
            .get(id)
            .ok_or_else(|| Error::UnknownGenerator { id: id.clone() })
    }

    pub fn run_result(&self, id: &GeneratorId) -> Result<&GeneratorRunResult> {
        self.driver(id)?
            .run_result()
            .ok_or_else(|| Error::UnknownGenerator { id: id.clone() })
    }

    /// The failure captured for a generator, if it failed.
    pub fn exception(&self, id: &GeneratorId) -> Result<Option<&GeneratorException>> {
        Ok(self.run_result(id)?.exception.as_ref())
    }

    /// Every generated tree, by generator in run order.
    pub fn generated_trees(&self) -> impl Iterator<Item = &SyntaxTree> {
        self.generator_results
            .values()
            .filter_map(GeneratorDriver::run_result)
            .flat_map(GeneratorRunResult::generated_trees)
    }

    pub fn generated_tree_count(&self) -> usize {
        self.generated_trees().count()
    }

    /// The first generated tree whose short file name is `short_name`.
    pub fn generated_file(&self, short_name: &str) -> Option<&SyntaxTree> {
        self.generated_trees()
            .find(|tree| tree.path().and_then(short_file_name) == Some(short_name))
    }

    /// Check whether the final compilation emits.
    pub fn emit(&self) -> EmitResult {
        self.compilation.emit()
    }

    /// A serializable digest of the result.
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            analyzer_diagnostics: self.analyzer_diagnostics.clone(),
            generator_diagnostics: self.generator_diagnostics.clone(),
            final_diagnostics: self.final_diagnostics.clone(),
            generators: self
                .generator_results
                .iter()
                .map(|(id, driver)| GeneratorSummary::new(id, driver))
                .collect(),
            emit_success: self.emit().success,
        }
    }
}

/// Serializable digest of a [`TestResult`].
///
/// Two runs of the same test case produce equal summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub analyzer_diagnostics: Vec<Diagnostic>,
    pub generator_diagnostics: Vec<Diagnostic>,
    pub final_diagnostics: Vec<Diagnostic>,
    pub generators: Vec<GeneratorSummary>,
    pub emit_success: bool,
}

impl ResultSummary {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One generator's part of a [`ResultSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorSummary {
    pub id: GeneratorId,
    pub kind: GeneratorKind,
    /// Paths of the generated trees.
    pub generated_files: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub exception: Option<GeneratorException>,
    pub tracked_inputs: usize,
}

impl GeneratorSummary {
    fn new(id: &GeneratorId, driver: &GeneratorDriver) -> Self {
        let run = driver.run_result();
        Self {
            id: id.clone(),
            kind: driver.generator().kind(),
            generated_files: run
                .map(|r| r.generated_trees().map(|t| t.file_path().to_string()).collect())
                .unwrap_or_default(),
            diagnostics: run.map(|r| r.diagnostics.clone()).unwrap_or_default(),
            exception: run.and_then(|r| r.exception.clone()),
            tracked_inputs: run.map(|r| r.tracked_inputs).unwrap_or_default(),
        }
    }
}
