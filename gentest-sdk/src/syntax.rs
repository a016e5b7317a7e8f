//! Source text handed to a front end.

use std::sync::Arc;

/// A unit of source text with an optional logical path.
///
/// Trees are cheap to clone; the text is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    path: Option<String>,
    text: Arc<str>,
}

impl SyntaxTree {
    /// Create a tree. An empty path is stored as no path.
    pub fn new(path: Option<&str>, text: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.filter(|p| !p.is_empty()).map(str::to_string),
            text: text.into(),
        }
    }

    /// The logical path, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The logical path, or an empty string when the tree has none.
    pub fn file_path(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }

    /// The full source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines of the text. A trailing newline yields a final empty line and
    /// `\r\n` terminators are stripped.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l))
    }

    /// Number of lines as counted by [`SyntaxTree::lines`].
    pub fn line_count(&self) -> usize {
        self.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_keep_trailing_empty_line() {
        let tree = SyntaxTree::new(None, "a\r\nb\n");
        assert_eq!(tree.lines().collect::<Vec<_>>(), vec!["a", "b", ""]);
        assert_eq!(tree.line_count(), 3);
    }

    #[test]
    fn test_empty_path() {
        let tree = SyntaxTree::new(Some(""), "class Foo {}");
        assert!(tree.path().is_none());
        assert_eq!(tree.file_path(), "");
    }
}
