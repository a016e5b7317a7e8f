//! Static analyzer interface.

use eyre::Result;

use crate::{CancellationToken, Compilation, Diagnostic};

/// A static analyzer that inspects a compilation and reports diagnostics.
///
/// # Example
///
/// ```ignore
/// struct NoGlobalTypes;
///
/// impl Analyzer for NoGlobalTypes {
///     fn id(&self) -> &str { "no-global-types" }
///
///     fn analyze(&self, compilation: &dyn Compilation, _cancel: &CancellationToken) -> Result<Vec<Diagnostic>> {
///         Ok(compilation
///             .declared_types()
///             .into_iter()
///             .filter(|t| t.namespace.is_none())
///             .map(|t| Diagnostic::warning("NG0001", format!("'{}' is in the global namespace", t.name)))
///             .collect())
///     }
/// }
/// ```
pub trait Analyzer: Send + Sync {
    /// Identifier used when the analyzer fails.
    fn id(&self) -> &str;

    /// Analyze the compilation.
    ///
    /// # Errors
    ///
    /// An error or a panic is reported by the engine as an `AD0001` warning.
    fn analyze(
        &self,
        compilation: &dyn Compilation,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>>;
}
