//! Text rendering for source code, trees and diagnostics.

use std::fmt::Write;

use gentest_sdk::{Diagnostic, SyntaxTree};

/// Name shown for trees without a usable path.
pub const UNKNOWN_FILE_NAME: &str = "Unknown";

/// Width of zero-padded line numbers for a block of `line_count` lines:
/// the digit count of the last zero-based index, at least one.
pub fn line_number_width(line_count: usize) -> usize {
    let last = line_count.saturating_sub(1);
    let mut width = 1;
    let mut rest = last / 10;
    while rest > 0 {
        width += 1;
        rest /= 10;
    }
    width
}

/// Render text as `NN | line` lines, numbered from zero, without a trailing
/// newline.
pub fn format_code(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let width = line_number_width(lines.len());
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:0width$} | {}", i, line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The last component of a tree path. `None` for empty paths.
pub fn short_file_name(path: &str) -> Option<&str> {
    path.rsplit(['/', '\\']).next().filter(|name| !name.is_empty())
}

/// Short file name of a tree, or [`UNKNOWN_FILE_NAME`].
pub fn tree_file_name(tree: &SyntaxTree) -> &str {
    tree.path()
        .and_then(short_file_name)
        .unwrap_or(UNKNOWN_FILE_NAME)
}

/// Render diagnostics one per block:
///
/// ```text
/// \t\tFoo.g.cs: (2,6)-(2,9): CS0246
/// \t\tThe type or namespace name ...
/// ```
///
/// The file part is left out for diagnostics without a file. There is no
/// trailing newline.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        out.push('\t');
        if let Some(name) = diagnostic.path().and_then(short_file_name) {
            let _ = write!(out, "\t{}: ", name);
        }
        let span = diagnostic.location.span.unwrap_or_default();
        let _ = writeln!(out, "{}: {}", span, diagnostic.id);
        let _ = writeln!(out, "\t\t{}", diagnostic.message);
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Comma-joined diagnostic ids.
pub fn ids_string(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.id.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// `[i] name` lines for a list of trees, each prefixed by `indent` tabs.
/// `None` when there are no trees.
pub fn tree_list<'a>(
    trees: impl IntoIterator<Item = &'a SyntaxTree>,
    indent: usize,
) -> Option<String> {
    let prefix = "\t".repeat(indent);
    let lines: Vec<String> = trees
        .into_iter()
        .enumerate()
        .map(|(i, tree)| format!("{}[{}] {}", prefix, i, tree_file_name(tree)))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
