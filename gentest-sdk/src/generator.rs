//! Source generator interfaces.
//!
//! Two kinds of generator are supported:
//!
//! - [`SourceGenerator`] - one-shot, sees the whole compilation once
//! - [`IncrementalGenerator`] - visits each syntax tree, then finalizes
//!
//! Both are wrapped in [`Generator`] and run by a
//! [`GeneratorDriver`](crate::GeneratorDriver).

use std::{fmt, sync::Arc};

use eyre::{Result, bail};
use serde::Serialize;

use crate::{CancellationToken, Compilation, Diagnostic, SyntaxTree};

/// Caller-assigned generator identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GeneratorId(String);

impl GeneratorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GeneratorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for GeneratorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A source file added by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// Name the generator chose, e.g. `Foo.g.cs`.
    pub hint_name: String,
    /// The tree, with path `<generator id>/<hint name>`.
    pub tree: SyntaxTree,
}

/// What a generator sees while it runs.
pub struct GeneratorContext<'a> {
    generator: &'a GeneratorId,
    compilation: &'a dyn Compilation,
    cancel: &'a CancellationToken,
    sources: Vec<GeneratedSource>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(
        generator: &'a GeneratorId,
        compilation: &'a dyn Compilation,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            generator,
            compilation,
            cancel,
            sources: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// The compilation the generator runs against.
    pub fn compilation(&self) -> &dyn Compilation {
        self.compilation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Add a generated source file.
    ///
    /// # Errors
    ///
    /// Fails if the generator already added a file with the same hint name.
    pub fn add_source(&mut self, hint_name: impl Into<String>, text: impl Into<String>) -> Result<()> {
        let hint_name = hint_name.into();
        if self.sources.iter().any(|s| s.hint_name == hint_name) {
            bail!("hint name '{}' was already added by this generator", hint_name);
        }
        let path = format!("{}/{}", self.generator, hint_name);
        self.sources.push(GeneratedSource {
            tree: SyntaxTree::new(Some(&path), text.into()),
            hint_name,
        });
        Ok(())
    }

    /// Report a diagnostic from the generator.
    pub fn report_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn into_parts(self) -> (Vec<GeneratedSource>, Vec<Diagnostic>) {
        (self.sources, self.diagnostics)
    }
}

/// A generator invoked once per compilation snapshot.
pub trait SourceGenerator: Send + Sync {
    fn id(&self) -> GeneratorId;

    /// Inspect the compilation and add sources.
    fn execute(&self, ctx: &mut GeneratorContext<'_>) -> Result<()>;
}

/// A generator that works tree by tree.
///
/// The driver calls [`generate_for_tree`](IncrementalGenerator::generate_for_tree)
/// for every syntax tree of the input compilation in order, then
/// [`finalize`](IncrementalGenerator::finalize) once.
pub trait IncrementalGenerator: Send + Sync {
    fn id(&self) -> GeneratorId;

    fn generate_for_tree(&self, tree: &SyntaxTree, ctx: &mut GeneratorContext<'_>) -> Result<()>;

    #[allow(unused_variables)]
    fn finalize(&self, ctx: &mut GeneratorContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Kind of a registered generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    OneShot,
    Incremental,
}

/// A generator of either kind.
#[derive(Clone)]
pub enum Generator {
    OneShot(Arc<dyn SourceGenerator>),
    Incremental(Arc<dyn IncrementalGenerator>),
}

impl Generator {
    pub fn one_shot(generator: impl SourceGenerator + 'static) -> Self {
        Self::OneShot(Arc::new(generator))
    }

    pub fn incremental(generator: impl IncrementalGenerator + 'static) -> Self {
        Self::Incremental(Arc::new(generator))
    }

    pub fn id(&self) -> GeneratorId {
        match self {
            Self::OneShot(g) => g.id(),
            Self::Incremental(g) => g.id(),
        }
    }

    pub fn kind(&self) -> GeneratorKind {
        match self {
            Self::OneShot(_) => GeneratorKind::OneShot,
            Self::Incremental(_) => GeneratorKind::Incremental,
        }
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .finish()
    }
}
