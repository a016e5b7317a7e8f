//! Compilation options.

use serde::{Deserialize, Serialize};

/// What kind of assembly a compilation produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// A library; no entry point is required.
    #[default]
    Library,
    /// A console program; requires a static `Main`.
    Console,
}

/// Options fixed for every compilation in a test configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationOptions {
    #[serde(default)]
    pub output_kind: OutputKind,
    /// Treat warnings as errors when emitting.
    #[serde(default)]
    pub warnings_as_errors: bool,
}

impl CompilationOptions {
    pub fn library() -> Self {
        Self::default()
    }

    pub fn console() -> Self {
        Self {
            output_kind: OutputKind::Console,
            ..Self::default()
        }
    }

    pub fn with_warnings_as_errors(mut self, enabled: bool) -> Self {
        self.warnings_as_errors = enabled;
        self
    }
}
