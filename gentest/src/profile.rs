//! Configuration profiles: the compilation settings of a test suite kept in
//! a TOML file.
//!
//! ```toml
//! assembly_name = "Acme.Tests"
//! output_kind = "library"
//! warnings_as_errors = true
//! references = ["refs/system.toml", "refs/acme.toml"]
//! ```
//!
//! Relative reference paths resolve against the directory of the profile.

use std::path::{Path, PathBuf};

use gentest_sdk::{CompilationOptions, MetadataReference, OutputKind};
use miette::{NamedSource, SourceSpan};
use serde::Deserialize;

use crate::{Error, Result};

/// Assembly name used when none is configured.
pub const DEFAULT_ASSEMBLY_NAME: &str = "CodeAnalysisVerification";

fn default_assembly_name() -> String {
    DEFAULT_ASSEMBLY_NAME.to_string()
}

/// A parsed profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default = "default_assembly_name")]
    pub assembly_name: String,
    #[serde(default)]
    pub output_kind: OutputKind,
    #[serde(default)]
    pub warnings_as_errors: bool,
    /// Paths of reference files.
    #[serde(default)]
    pub references: Vec<PathBuf>,
    /// Directory relative reference paths resolve against.
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Profile {
    /// Read a profile from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ProfileIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut profile = Self::parse(&content, &path.display().to_string())?;
        profile.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(profile)
    }

    /// Parse profile TOML. Relative reference paths resolve against the
    /// current directory.
    pub fn parse(content: &str, filename: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ProfileParse {
            span: source.span().map(SourceSpan::from),
            src: NamedSource::new(filename, content.to_string()),
            source,
        })
    }

    pub fn compilation_options(&self) -> CompilationOptions {
        CompilationOptions {
            output_kind: self.output_kind,
            warnings_as_errors: self.warnings_as_errors,
        }
    }

    /// Reference paths with relative ones resolved.
    pub fn reference_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.references.iter().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.base_dir.join(path)
            }
        })
    }

    /// Load every reference file, in order.
    pub fn load_references(&self) -> Result<Vec<MetadataReference>> {
        self.reference_paths()
            .map(|path| MetadataReference::from_file(path).map_err(Error::from))
            .collect()
    }
}
