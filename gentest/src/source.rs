//! Source fragments and their decoration into compilable text.

/// A piece of test code with an optional logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFragment {
    path: Option<String>,
    code: String,
}

impl SourceFragment {
    /// A fragment without a path.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            path: None,
            code: code.into(),
        }
    }

    /// A fragment with a logical path, used for file lookup and diagnostic
    /// locations.
    pub fn at_path(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            code: code.into(),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl From<&str> for SourceFragment {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for SourceFragment {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

/// Build the text handed to the front end for one fragment.
///
/// The header is one `using` line per import, a blank line if there were
/// any imports, then a file-scoped namespace line and a blank line if a
/// namespace is set. The fragment follows verbatim.
pub fn decorate(imports: &[String], namespace: Option<&str>, fragment: &SourceFragment) -> String {
    let mut text = String::new();
    for import in imports {
        text.push_str("using ");
        text.push_str(import);
        text.push_str(";\n");
    }
    if !imports.is_empty() {
        text.push('\n');
    }
    if let Some(namespace) = namespace {
        text.push_str("namespace ");
        text.push_str(namespace);
        text.push_str(";\n\n");
    }
    text.push_str(&fragment.code);
    text
}

/// Number of lines [`decorate`] puts in front of every fragment.
pub fn header_line_count(imports: &[String], namespace: Option<&str>) -> usize {
    let imports = if imports.is_empty() { 0 } else { imports.len() + 1 };
    let namespace = if namespace.is_some() { 2 } else { 0 };
    imports + namespace
}
