//! The compiler front end boundary.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use serde::Serialize;

use crate::{
    Analyzer, CancellationToken, Cancelled, CompilationOptions, Diagnostic, MetadataReference,
    SyntaxTree, cancel, driver::panic_message,
};

/// Shared handle to an immutable compilation snapshot.
pub type CompilationRef = Arc<dyn Compilation>;

/// A type declared in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeSymbol {
    /// Containing namespace; `None` for the global namespace.
    pub namespace: Option<String>,
    pub name: String,
    /// Path of the tree that declares it.
    pub path: Option<String>,
}

impl TypeSymbol {
    /// Namespace-qualified name.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

/// Outcome of emitting a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmitResult {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// An immutable, queryable set of syntax trees plus references.
///
/// Implementations must be pure: asking the same snapshot for diagnostics
/// twice yields the same list in the same order.
pub trait Compilation: Send + Sync + fmt::Debug {
    fn assembly_name(&self) -> &str;

    fn syntax_trees(&self) -> &[SyntaxTree];

    fn references(&self) -> &[MetadataReference];

    fn options(&self) -> &CompilationOptions;

    /// Every diagnostic the compilation produces, in a stable order.
    fn diagnostics(&self) -> Vec<Diagnostic>;

    /// Types declared by the syntax trees, in declaration order.
    fn declared_types(&self) -> Vec<TypeSymbol>;

    /// A new snapshot with `trees` appended.
    fn add_syntax_trees(&self, trees: Vec<SyntaxTree>) -> CompilationRef;

    /// Check whether the compilation would emit successfully.
    fn emit(&self) -> EmitResult {
        let diagnostics = self.diagnostics();
        let warnings_as_errors = self.options().warnings_as_errors;
        let success = !diagnostics
            .iter()
            .any(|d| d.severity.is_error() || (warnings_as_errors && d.severity.is_warning()));
        EmitResult {
            success,
            diagnostics,
        }
    }

    /// True if a type with the given simple name is declared in source.
    fn declares_type(&self, name: &str) -> bool {
        self.declared_types().iter().any(|t| t.name == name)
    }
}

/// A compiler front end: parses text and assembles compilations.
pub trait FrontEnd: Send + Sync {
    /// The name of this front end (for logging).
    fn name(&self) -> &'static str;

    /// Parse source text into a syntax tree.
    ///
    /// Syntax errors are not reported here; they surface in the
    /// compilation's diagnostics.
    fn parse(
        &self,
        text: &str,
        path: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<SyntaxTree, Cancelled> {
        cancel::check(cancel)?;
        Ok(SyntaxTree::new(path, text))
    }

    /// Assemble a compilation snapshot. Never fails; problems become
    /// diagnostics of the snapshot.
    fn create_compilation(
        &self,
        assembly_name: &str,
        trees: Vec<SyntaxTree>,
        references: Vec<MetadataReference>,
        options: CompilationOptions,
    ) -> CompilationRef;

    /// Run analyzers against a compilation and collect every diagnostic
    /// they report.
    ///
    /// An analyzer that fails or panics is reported as an `AD0001` warning
    /// instead of aborting the others.
    fn analyze(
        &self,
        compilation: &CompilationRef,
        analyzers: &[Arc<dyn Analyzer>],
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let mut diagnostics = Vec::new();
        for analyzer in analyzers {
            cancel::check(cancel)?;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                analyzer.analyze(compilation.as_ref(), cancel)
            }));
            let failure = match outcome {
                Ok(Ok(reported)) => {
                    diagnostics.extend(reported);
                    continue;
                }
                Ok(Err(err)) => err.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };
            diagnostics.push(Diagnostic::warning(
                "AD0001",
                format!(
                    "Analyzer '{}' threw an exception: {}",
                    analyzer.id(),
                    failure
                ),
            ));
        }
        cancel::check(cancel)?;
        Ok(diagnostics)
    }
}
