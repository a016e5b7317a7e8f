//! Metadata references: the external libraries a compilation can see.
//!
//! A reference is described by the namespaces it exports and the type names
//! inside each namespace. References can be built in code or read from a
//! TOML reference file:
//!
//! ```toml
//! name = "Acme.Logging"
//!
//! [[namespaces]]
//! name = "Acme.Logging"
//! types = ["ILogger", "LogLevel"]
//! ```

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a reference file.
#[derive(Debug, Error, Diagnostic)]
pub enum ReferenceError {
    #[error("failed to read reference '{path}'")]
    #[diagnostic(code(gentest::reference::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse reference file")]
    #[diagnostic(
        code(gentest::reference::parse),
        help("a reference file needs a `name` and a list of `[[namespaces]]` tables")
    )]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },
}

/// Types exported by one namespace of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceExports {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// An external library a compilation is built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataReference {
    name: String,
    #[serde(default)]
    namespaces: Vec<NamespaceExports>,
}

impl MetadataReference {
    /// Create an empty reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
        }
    }

    /// Add a namespace with its exported types.
    pub fn with_namespace<I, S>(mut self, namespace: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces.push(NamespaceExports {
            name: namespace.into(),
            types: types.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Read a reference from a TOML reference file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse reference TOML, naming the source for error reporting.
    pub fn parse(content: &str, filename: &str) -> Result<Self, ReferenceError> {
        toml::from_str(content).map_err(|source| ReferenceError::Parse {
            span: source.span().map(SourceSpan::from),
            src: NamedSource::new(filename, content.to_string()),
            source,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespaces(&self) -> &[NamespaceExports] {
        &self.namespaces
    }

    /// True if the reference exports the namespace (or any child of it).
    pub fn exports_namespace(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|ns| {
            ns.name == namespace
                || ns
                    .name
                    .strip_prefix(namespace)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// True if the reference exports `type_name` from `namespace`.
    pub fn exports_type(&self, namespace: &str, type_name: &str) -> bool {
        self.namespaces
            .iter()
            .any(|ns| ns.name == namespace && ns.types.iter().any(|t| t == type_name))
    }
}

impl FromStr for MetadataReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, "reference.toml")
    }
}
