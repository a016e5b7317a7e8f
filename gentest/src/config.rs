//! Immutable test configuration.

use std::{fmt, path::Path, sync::Arc};

use gentest_sdk::{
    Analyzer, CompilationOptions, FrontEnd, Generator, GeneratorId, IncrementalGenerator,
    MetadataReference, SourceGenerator,
};
use indexmap::IndexSet;

use crate::{
    Error, Result,
    filter::{DiagnosticFilter, FilterChain},
    profile::{DEFAULT_ASSEMBLY_NAME, Profile},
};

/// Everything a test case compiles against: front end, references,
/// analyzers, generators, diagnostic filters and compilation options.
///
/// A configuration is never modified. Every `with_*` method returns a new
/// value, so one base configuration can be shared by many test cases and
/// specialized per case.
///
/// # Example
///
/// ```ignore
/// let base = TestConfiguration::new(MiniCs::shared(), vec![core_library()]);
/// let config = base
///     .with_additional_incremental_generators([Arc::new(MyGenerator) as _])?
///     .with_additional_diagnostic_filters([filter::not_hidden()]);
/// ```
#[derive(Clone)]
pub struct TestConfiguration {
    front_end: Arc<dyn FrontEnd>,
    assembly_name: String,
    references: Vec<MetadataReference>,
    options: CompilationOptions,
    analyzers: Vec<Arc<dyn Analyzer>>,
    generators: Vec<Arc<dyn SourceGenerator>>,
    incremental_generators: Vec<Arc<dyn IncrementalGenerator>>,
    generator_ids: IndexSet<GeneratorId>,
    filters: FilterChain,
}

impl TestConfiguration {
    /// A configuration with no analyzers, generators or filters, building
    /// libraries named [`DEFAULT_ASSEMBLY_NAME`].
    pub fn new(front_end: Arc<dyn FrontEnd>, references: Vec<MetadataReference>) -> Self {
        Self {
            front_end,
            assembly_name: DEFAULT_ASSEMBLY_NAME.to_string(),
            references,
            options: CompilationOptions::default(),
            analyzers: Vec::new(),
            generators: Vec::new(),
            incremental_generators: Vec::new(),
            generator_ids: IndexSet::new(),
            filters: FilterChain::new(),
        }
    }

    /// The usual setup for testing one incremental generator.
    pub fn single_generator(
        front_end: Arc<dyn FrontEnd>,
        references: Vec<MetadataReference>,
        generator: Arc<dyn IncrementalGenerator>,
    ) -> Self {
        let id = generator.id();
        let mut config = Self::new(front_end, references);
        config.generator_ids.insert(id);
        config.incremental_generators.push(generator);
        config
    }

    /// A configuration built from a profile file.
    pub fn from_profile(front_end: Arc<dyn FrontEnd>, path: impl AsRef<Path>) -> Result<Self> {
        let profile = Profile::from_file(path)?;
        let references = profile.load_references()?;
        Ok(Self::new(front_end, references)
            .with_assembly_name(profile.assembly_name.clone())
            .with_compilation_options(profile.compilation_options()))
    }

    pub fn with_assembly_name(&self, assembly_name: impl Into<String>) -> Self {
        Self {
            assembly_name: assembly_name.into(),
            ..self.clone()
        }
    }

    pub fn with_compilation_options(&self, options: CompilationOptions) -> Self {
        Self {
            options,
            ..self.clone()
        }
    }

    pub fn with_additional_references(
        &self,
        references: impl IntoIterator<Item = MetadataReference>,
    ) -> Self {
        let mut next = self.clone();
        next.references.extend(references);
        next
    }

    pub fn with_additional_analyzers(
        &self,
        analyzers: impl IntoIterator<Item = Arc<dyn Analyzer>>,
    ) -> Self {
        let mut next = self.clone();
        next.analyzers.extend(analyzers);
        next
    }

    /// Add one-shot generators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateGenerator`] if a generator id is already
    /// registered, including ids repeated within `generators`.
    pub fn with_additional_generators(
        &self,
        generators: impl IntoIterator<Item = Arc<dyn SourceGenerator>>,
    ) -> Result<Self> {
        let mut next = self.clone();
        for generator in generators {
            next.track(generator.id())?;
            next.generators.push(generator);
        }
        Ok(next)
    }

    /// Add incremental generators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateGenerator`] if a generator id is already
    /// registered, including ids repeated within `generators`.
    pub fn with_additional_incremental_generators(
        &self,
        generators: impl IntoIterator<Item = Arc<dyn IncrementalGenerator>>,
    ) -> Result<Self> {
        let mut next = self.clone();
        for generator in generators {
            next.track(generator.id())?;
            next.incremental_generators.push(generator);
        }
        Ok(next)
    }

    pub fn with_additional_diagnostic_filters(
        &self,
        filters: impl IntoIterator<Item = DiagnosticFilter>,
    ) -> Self {
        Self {
            filters: self.filters.clone().extend(filters),
            ..self.clone()
        }
    }

    fn track(&mut self, id: GeneratorId) -> Result<()> {
        if self.generator_ids.contains(&id) {
            return Err(Error::DuplicateGenerator { id });
        }
        self.generator_ids.insert(id);
        Ok(())
    }

    pub fn front_end(&self) -> &Arc<dyn FrontEnd> {
        &self.front_end
    }

    pub fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    pub fn references(&self) -> &[MetadataReference] {
        &self.references
    }

    pub fn compilation_options(&self) -> &CompilationOptions {
        &self.options
    }

    pub fn analyzers(&self) -> &[Arc<dyn Analyzer>] {
        &self.analyzers
    }

    /// Every generator in run order: one-shot generators first, then
    /// incremental ones, each in registration order.
    pub fn generators(&self) -> impl Iterator<Item = Generator> + '_ {
        self.generators
            .iter()
            .cloned()
            .map(Generator::OneShot)
            .chain(
                self.incremental_generators
                    .iter()
                    .cloned()
                    .map(Generator::Incremental),
            )
    }

    pub fn generator_count(&self) -> usize {
        self.generator_ids.len()
    }

    pub fn has_generator(&self, id: &GeneratorId) -> bool {
        self.generator_ids.contains(id)
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }
}

impl fmt::Debug for TestConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestConfiguration")
            .field("front_end", &self.front_end.name())
            .field("assembly_name", &self.assembly_name)
            .field("references", &self.references.len())
            .field("options", &self.options)
            .field("analyzers", &self.analyzers.len())
            .field("generators", &self.generator_ids)
            .field("filters", &self.filters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use eyre::Result as EyreResult;
    use gentest_minics::{MiniCs, core_library};
    use gentest_sdk::{GeneratorContext, GeneratorKind, SyntaxTree};

    use super::*;
    use crate::filter;

    struct Named(&'static str);

    impl SourceGenerator for Named {
        fn id(&self) -> GeneratorId {
            self.0.into()
        }

        fn execute(&self, _ctx: &mut GeneratorContext<'_>) -> EyreResult<()> {
            Ok(())
        }
    }

    impl IncrementalGenerator for Named {
        fn id(&self) -> GeneratorId {
            self.0.into()
        }

        fn generate_for_tree(
            &self,
            _tree: &SyntaxTree,
            _ctx: &mut GeneratorContext<'_>,
        ) -> EyreResult<()> {
            Ok(())
        }
    }

    fn base() -> TestConfiguration {
        TestConfiguration::new(MiniCs::shared(), vec![core_library()])
    }

    fn one_shot(id: &'static str) -> Arc<dyn SourceGenerator> {
        Arc::new(Named(id))
    }

    fn incremental(id: &'static str) -> Arc<dyn IncrementalGenerator> {
        Arc::new(Named(id))
    }

    #[test]
    fn test_defaults() {
        let config = base();
        assert_eq!(config.assembly_name(), "CodeAnalysisVerification");
        assert_eq!(config.references().len(), 1);
        assert_eq!(config.generator_count(), 0);
        assert!(config.filters().is_empty());
    }

    #[test]
    fn test_derivation_leaves_base_untouched() {
        let base = base();
        let derived = base
            .with_additional_generators([one_shot("a")])
            .unwrap()
            .with_additional_diagnostic_filters([filter::not_hidden()])
            .with_assembly_name("Derived");

        assert_eq!(base.generator_count(), 0);
        assert!(base.filters().is_empty());
        assert_eq!(base.assembly_name(), "CodeAnalysisVerification");
        assert_eq!(derived.generator_count(), 1);
        assert_eq!(derived.filters().len(), 1);
        assert_eq!(derived.assembly_name(), "Derived");
    }

    #[test]
    fn test_duplicate_across_kinds_is_rejected() {
        let config = base().with_additional_generators([one_shot("gen")]).unwrap();
        let err = config
            .with_additional_incremental_generators([incremental("gen")])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateGenerator { id } if id.as_str() == "gen"));
    }

    #[test]
    fn test_duplicate_within_one_call_is_rejected() {
        let err = base()
            .with_additional_generators([one_shot("x"), one_shot("x")])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateGenerator { .. }));
    }

    #[test]
    fn test_run_order_is_one_shot_then_incremental() {
        let config = base()
            .with_additional_incremental_generators([incremental("inc-1")])
            .unwrap()
            .with_additional_generators([one_shot("shot-1"), one_shot("shot-2")])
            .unwrap()
            .with_additional_incremental_generators([incremental("inc-2")])
            .unwrap();

        let order: Vec<_> = config
            .generators()
            .map(|g| (g.id().to_string(), g.kind()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("shot-1".to_string(), GeneratorKind::OneShot),
                ("shot-2".to_string(), GeneratorKind::OneShot),
                ("inc-1".to_string(), GeneratorKind::Incremental),
                ("inc-2".to_string(), GeneratorKind::Incremental),
            ]
        );
    }

    #[test]
    fn test_single_generator() {
        let config = TestConfiguration::single_generator(
            MiniCs::shared(),
            vec![core_library()],
            incremental("only"),
        );
        assert!(config.has_generator(&"only".into()));
        assert_eq!(config.generators().count(), 1);
    }
}
