//! Diagnostic filter chain.
//!
//! A filter is a pure predicate over one diagnostic. A [`FilterChain`] keeps
//! a diagnostic only when every filter in it accepts the diagnostic.

use std::{fmt, sync::Arc};

use gentest_sdk::{Diagnostic, Severity};

use crate::format::short_file_name;

/// A predicate deciding whether a diagnostic is kept.
pub type DiagnosticFilter = Arc<dyn Fn(&Diagnostic) -> bool + Send + Sync>;

/// An ordered AND-combination of diagnostic filters.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<DiagnosticFilter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain with `filter` appended.
    pub fn with(mut self, filter: DiagnosticFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// A chain with every filter of `filters` appended.
    pub fn extend(mut self, filters: impl IntoIterator<Item = DiagnosticFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// True if every filter accepts the diagnostic.
    pub fn accepts(&self, diagnostic: &Diagnostic) -> bool {
        self.filters.iter().all(|filter| filter(diagnostic))
    }

    /// Keep the diagnostics the chain accepts, preserving order.
    pub fn apply(&self, diagnostics: &[Diagnostic]) -> Vec<Diagnostic> {
        diagnostics
            .iter()
            .filter(|d| self.accepts(d))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("len", &self.filters.len())
            .finish()
    }
}

/// Reject hidden diagnostics.
pub fn not_hidden() -> DiagnosticFilter {
    Arc::new(|d: &Diagnostic| !d.severity.is_hidden())
}

/// Keep diagnostics at or above `severity`.
pub fn min_severity(severity: Severity) -> DiagnosticFilter {
    Arc::new(move |d: &Diagnostic| d.severity >= severity)
}

/// Reject diagnostics with any of the given ids.
pub fn exclude_ids<I, S>(ids: I) -> DiagnosticFilter
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
    Arc::new(move |d: &Diagnostic| !ids.contains(&d.id))
}

/// Keep diagnostics located in the file with the given short name.
/// Diagnostics without a file pass.
pub fn in_file(short_name: impl Into<String>) -> DiagnosticFilter {
    let short_name = short_name.into();
    Arc::new(move |d: &Diagnostic| match d.path() {
        None => true,
        Some(path) => short_file_name(path) == Some(short_name.as_str()),
    })
}
