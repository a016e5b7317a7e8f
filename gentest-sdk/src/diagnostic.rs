//! Diagnostic types shared by front ends, analyzers and generators.
//!
//! A [`Diagnostic`] is plain data: an identifier, a [`Severity`], a message
//! and an optional [`Location`]. Nothing in the harness ever throws a
//! diagnostic; they are collected and handed back to the caller.

use std::fmt;

use serde::Serialize;

/// Severity level for a diagnostic message.
///
/// Variants are ordered from least to most severe, so `Severity::Warning >
/// Severity::Info` holds and minimum-severity filters can compare directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something only tooling cares about (e.g. an unnecessary using directive).
    Hidden,
    /// Informational message.
    Info,
    /// A warning that doesn't prevent emission.
    Warning,
    /// An error that prevents successful emission.
    Error,
}

impl Severity {
    /// Order in which severity groups are displayed.
    pub const DISPLAY_ORDER: [Severity; 4] = [
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Hidden,
    ];

    /// Returns true if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns true if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// Returns true if this is a hidden severity.
    pub fn is_hidden(&self) -> bool {
        matches!(self, Severity::Hidden)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hidden => write!(f, "hidden"),
        }
    }
}

/// A zero-based line and character position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LinePosition {
    pub line: usize,
    pub character: usize,
}

impl LinePosition {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for LinePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.character)
    }
}

/// A span between two line positions, rendered as `(l,c)-(l,c)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LineSpan {
    pub start: LinePosition,
    pub end: LinePosition,
}

impl LineSpan {
    pub fn new(start: LinePosition, end: LinePosition) -> Self {
        Self { start, end }
    }

    /// A span covering `len` characters on a single line.
    pub fn on_line(line: usize, character: usize, len: usize) -> Self {
        Self {
            start: LinePosition::new(line, character),
            end: LinePosition::new(line, character + len),
        }
    }
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Where a diagnostic points to.
///
/// Both parts are optional: compilation-wide diagnostics (a missing entry
/// point, an analyzer crash) have neither a file nor a span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Path of the syntax tree the diagnostic belongs to.
    pub path: Option<String>,
    /// Position inside that tree.
    pub span: Option<LineSpan>,
}

impl Location {
    /// A location that points nowhere.
    pub fn none() -> Self {
        Self::default()
    }

    /// A location inside a tree. An empty path is treated as no path.
    pub fn in_tree(path: Option<&str>, span: LineSpan) -> Self {
        Self {
            path: path.filter(|p| !p.is_empty()).map(str::to_string),
            span: Some(span),
        }
    }

    /// True when the location references a source tree.
    pub fn is_in_source(&self) -> bool {
        self.path.is_some()
    }
}

/// A diagnostic reported by compilation, analysis or generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    /// Stable identifier such as `CS0246`.
    pub id: String,
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// Where the diagnostic points to.
    pub location: Location,
}

impl Diagnostic {
    /// Create a diagnostic without a location.
    pub fn new(id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            location: Location::none(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, Severity::Warning, message)
    }

    /// Create a new info diagnostic.
    pub fn info(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, Severity::Info, message)
    }

    /// Create a new hidden diagnostic.
    pub fn hidden(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, Severity::Hidden, message)
    }

    /// Attach a location to this diagnostic.
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Path of the tree this diagnostic points into, if any.
    pub fn path(&self) -> Option<&str> {
        self.location.path.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.id, self.message)?;
        match (&self.location.path, &self.location.span) {
            (Some(path), Some(span)) => write!(f, " (at {}{})", path, span),
            (Some(path), None) => write!(f, " (at {})", path),
            (None, Some(span)) => write!(f, " (at {})", span),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_error() {
        let diag = Diagnostic::error("CS0246", "type not found");
        assert!(diag.severity.is_error());
        assert_eq!(diag.id, "CS0246");
        assert!(diag.path().is_none());
    }

    #[test]
    fn test_diagnostic_with_location() {
        let diag = Diagnostic::warning("GEN8785", "generator failed")
            .at(Location::in_tree(Some("Foo.cs"), LineSpan::on_line(2, 6, 3)));
        assert_eq!(diag.path(), Some("Foo.cs"));
        assert_eq!(diag.to_string(), "warning GEN8785: generator failed (at Foo.cs(2,6)-(2,9))");
    }

    #[test]
    fn test_empty_path_is_no_path() {
        let location = Location::in_tree(Some(""), LineSpan::default());
        assert!(!location.is_in_source());
        assert!(location.span.is_some());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Hidden.to_string(), "hidden");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Info > Severity::Hidden);
        assert_eq!(Severity::DISPLAY_ORDER[0], Severity::Error);
        assert_eq!(Severity::DISPLAY_ORDER[3], Severity::Hidden);
    }
}
