//! Declaration parser for the mini C# dialect.
//!
//! Only the declaration skeleton is parsed: using directives, namespaces,
//! type declarations with their base lists, and whether a static `Main`
//! exists. Member bodies are skipped with brace matching.

use gentest_sdk::{LinePosition, LineSpan};

use crate::lexer::{Token, tokenize};

const TYPE_KEYWORDS: &[&str] = &["class", "struct", "interface", "record", "enum"];

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "sealed",
    "abstract",
    "partial",
    "readonly",
    "file",
    "unsafe",
    "new",
    "ref",
];

/// A syntax error found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub id: &'static str,
    pub message: String,
    pub span: LineSpan,
}

/// A dotted name with its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRef {
    /// The name without any `global::` qualifier.
    pub name: String,
    pub span: LineSpan,
    /// Written as `global::Name`, so only the global namespace is searched.
    pub global: bool,
}

/// `using Some.Namespace;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDirective {
    pub name: NameRef,
    /// Enclosing namespace for directives inside a namespace block.
    pub scope: Option<String>,
}

/// A type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: NameRef,
    pub namespace: Option<String>,
    /// Simple name of the enclosing type for nested declarations.
    pub containing_type: Option<String>,
    pub partial: bool,
    pub bases: Vec<NameRef>,
    /// Indices into [`ParsedTree::usings`] visible to this declaration.
    pub usings_in_scope: Vec<usize>,
}

/// The declaration skeleton of one syntax tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTree {
    pub usings: Vec<UsingDirective>,
    pub types: Vec<TypeDecl>,
    /// Every namespace declared by the tree, fully qualified.
    pub namespaces: Vec<String>,
    pub has_main: bool,
    pub errors: Vec<SyntaxError>,
}

/// Parse source text into its declaration skeleton.
pub fn parse(text: &str) -> ParsedTree {
    let tokens = tokenize(text);
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        tree: ParsedTree::default(),
        namespaces: Vec::new(),
        usings_in_scope: Vec::new(),
        file_scoped: false,
    };
    parser.parse_members(false);
    parser.tree
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    tree: ParsedTree,
    namespaces: Vec<String>,
    usings_in_scope: Vec<usize>,
    /// A file-scoped namespace has been declared.
    file_scoped: bool,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    fn current_namespace(&self) -> Option<String> {
        self.namespaces.last().cloned()
    }

    fn error(&mut self, id: &'static str, message: impl Into<String>, span: LineSpan) {
        self.tree.errors.push(SyntaxError {
            id,
            message: message.into(),
            span,
        });
    }

    /// Zero-width span right after the previous token (or at the start).
    fn span_after_previous(&self) -> LineSpan {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => {
                let end = LinePosition::new(token.line, token.column + token.len);
                LineSpan::new(end, end)
            }
            None => LineSpan::default(),
        }
    }

    fn span_at_end(&self) -> LineSpan {
        match self.tokens.last() {
            Some(token) => {
                let end = LinePosition::new(token.line, token.column + token.len);
                LineSpan::new(end, end)
            }
            None => LineSpan::default(),
        }
    }

    fn expect_punct(&mut self, c: char, id: &'static str) -> bool {
        if self.peek().is_some_and(|t| t.is_punct(c)) {
            self.pos += 1;
            true
        } else {
            let span = self.span_after_previous();
            self.error(id, format!("{} expected", c), span);
            false
        }
    }

    /// Parse members until end of input, or until a closing brace when
    /// `closing` is set. Returns whether the closing brace was found.
    fn parse_members(&mut self, closing: bool) -> bool {
        while let Some(token) = self.peek() {
            if token.is_punct('}') {
                self.pos += 1;
                if closing {
                    return true;
                }
                self.unexpected(token);
            } else if token.is_ident("using") {
                self.parse_using();
            } else if token.is_ident("namespace") {
                self.parse_namespace();
            } else if token.is_punct(';') {
                self.pos += 1;
            } else if token.is_punct('[') {
                self.skip_balanced('[', ']');
            } else if !self.parse_type_decl(None) {
                self.pos += 1;
                self.unexpected(token);
            }
        }
        false
    }

    fn unexpected(&mut self, token: &Token) {
        self.error(
            "CS1022",
            "Type or namespace definition, or end-of-file expected",
            LineSpan::on_line(token.line, token.column, token.len),
        );
    }

    fn parse_using(&mut self) {
        self.pos += 1;
        if self.peek().is_some_and(|t| t.is_ident("static")) {
            self.pos += 1;
        }

        let Some(name) = self.parse_name() else {
            let span = self.span_after_previous();
            self.error("CS1001", "Identifier expected", span);
            self.skip_past(';');
            return;
        };

        // alias directives do not import a namespace
        if self.peek().is_some_and(|t| t.is_punct('=')) {
            self.skip_past(';');
            return;
        }

        self.expect_punct(';', "CS1002");
        self.tree.usings.push(UsingDirective {
            name,
            scope: self.current_namespace(),
        });
        self.usings_in_scope.push(self.tree.usings.len() - 1);
    }

    fn parse_namespace(&mut self) {
        self.pos += 1;
        let Some(name) = self.parse_name() else {
            let span = self.span_after_previous();
            self.error("CS1001", "Identifier expected", span);
            return;
        };

        let span = name.span;
        let full = match self.current_namespace() {
            Some(outer) => format!("{}.{}", outer, name.name),
            None => name.name,
        };

        match self.peek() {
            Some(t) if t.is_punct(';') => {
                self.pos += 1;
                if self.file_scoped {
                    self.error(
                        "CS8954",
                        "Source file can only contain one file-scoped namespace declaration",
                        span,
                    );
                    return;
                }
                self.file_scoped = true;
                self.tree.namespaces.push(full.clone());
                self.namespaces.push(full);
            }
            Some(t) if t.is_punct('{') => {
                self.pos += 1;
                self.tree.namespaces.push(full.clone());
                self.namespaces.push(full);
                let visible = self.usings_in_scope.len();
                if !self.parse_members(true) {
                    let span = self.span_at_end();
                    self.error("CS1513", "} expected", span);
                }
                self.usings_in_scope.truncate(visible);
                self.namespaces.pop();
            }
            _ => {
                self.tree.namespaces.push(full);
                let span = self.span_after_previous();
                self.error("CS1514", "{ expected", span);
            }
        }
    }

    /// Try to parse a type declaration at the current position. Returns
    /// false (without consuming anything) if the tokens are not one.
    fn parse_type_decl(&mut self, containing_type: Option<&str>) -> bool {
        let start = self.pos;
        let mut partial = false;
        while let Some(word) = self.peek().and_then(Token::ident) {
            if !MODIFIERS.contains(&word) {
                break;
            }
            partial |= word == "partial";
            self.pos += 1;
        }

        let Some(keyword) = self
            .peek()
            .and_then(Token::ident)
            .filter(|w| TYPE_KEYWORDS.contains(w))
        else {
            self.pos = start;
            return false;
        };
        self.pos += 1;
        if keyword == "record"
            && self
                .peek()
                .is_some_and(|t| t.is_ident("class") || t.is_ident("struct"))
        {
            self.pos += 1;
        }

        let Some(name_token) = self.peek().filter(|t| t.ident().is_some()) else {
            let span = self.span_after_previous();
            self.error("CS1001", "Identifier expected", span);
            return true;
        };
        self.pos += 1;
        let name = NameRef {
            name: name_token.ident().unwrap_or_default().to_string(),
            span: LineSpan::on_line(name_token.line, name_token.column, name_token.len),
            global: false,
        };

        if self.peek().is_some_and(|t| t.is_punct('<')) {
            self.skip_balanced('<', '>');
        }
        if self.peek().is_some_and(|t| t.is_punct('(')) {
            self.skip_balanced('(', ')');
        }

        let mut bases = Vec::new();
        if self.peek().is_some_and(|t| t.is_punct(':')) {
            self.pos += 1;
            loop {
                match self.parse_name() {
                    Some(base) => bases.push(base),
                    None => {
                        let span = self.span_after_previous();
                        self.error("CS1001", "Identifier expected", span);
                        break;
                    }
                }
                if self.peek().is_some_and(|t| t.is_punct(',')) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }

        // generic constraints
        if self.peek().is_some_and(|t| t.is_ident("where")) {
            while self
                .peek()
                .is_some_and(|t| !t.is_punct('{') && !t.is_punct(';'))
            {
                self.pos += 1;
            }
        }

        let simple_name = name.name.clone();
        self.tree.types.push(TypeDecl {
            name,
            namespace: self.current_namespace(),
            containing_type: containing_type.map(str::to_string),
            partial,
            bases,
            usings_in_scope: self.usings_in_scope.clone(),
        });

        match self.peek() {
            Some(t) if t.is_punct('{') => self.parse_type_body(&simple_name),
            Some(t) if t.is_punct(';') => self.pos += 1,
            _ => {
                let span = self.span_after_previous();
                self.error("CS1514", "{ expected", span);
            }
        }
        true
    }

    fn parse_type_body(&mut self, type_name: &str) {
        self.pos += 1;
        let mut depth = 1usize;
        let mut saw_static = false;

        while let Some(token) = self.peek() {
            if token.is_punct('{') {
                depth += 1;
                saw_static = false;
            } else if token.is_punct('}') {
                depth -= 1;
                saw_static = false;
                if depth == 0 {
                    self.pos += 1;
                    return;
                }
            } else if token.is_punct(';') {
                saw_static = false;
            } else if token.is_ident("static") {
                saw_static = true;
            } else if token.is_ident("Main")
                && saw_static
                && self.peek_at(1).is_some_and(|t| t.is_punct('('))
            {
                self.tree.has_main = true;
            } else if depth == 1
                && token.ident().is_some_and(|w| TYPE_KEYWORDS.contains(&w))
                && self.peek_at(1).is_some_and(|t| t.ident().is_some())
            {
                self.rewind_modifiers();
                if self.parse_type_decl(Some(type_name)) {
                    saw_static = false;
                    continue;
                }
            }
            self.pos += 1;
        }

        let span = self.span_at_end();
        self.error("CS1513", "} expected", span);
    }

    /// Step back over modifiers preceding the current token so a nested
    /// declaration sees them.
    fn rewind_modifiers(&mut self) {
        while self.pos > 0
            && self.tokens[self.pos - 1]
                .ident()
                .is_some_and(|w| MODIFIERS.contains(&w))
        {
            self.pos -= 1;
        }
    }

    /// Consume a leading `global::` qualifier, returning the `global` token.
    fn parse_global_alias(&mut self) -> Option<&'t Token> {
        match (self.peek(), self.peek_at(1), self.peek_at(2)) {
            (Some(alias), Some(a), Some(b))
                if alias.is_ident("global") && a.is_punct(':') && b.is_punct(':') =>
            {
                self.pos += 3;
                Some(alias)
            }
            _ => None,
        }
    }

    fn parse_name(&mut self) -> Option<NameRef> {
        let alias = self.parse_global_alias();
        let first = self.peek().filter(|t| t.ident().is_some())?;
        self.pos += 1;
        let start = alias.unwrap_or(first);
        let mut name = first.ident().unwrap_or_default().to_string();
        let mut last = first;

        loop {
            if self.peek().is_some_and(|t| t.is_punct('<')) {
                let before = self.pos;
                self.skip_balanced('<', '>');
                if let Some(closing) = self.tokens.get(self.pos.saturating_sub(1)) {
                    if self.pos > before {
                        last = closing;
                    }
                }
            }
            match (self.peek(), self.peek_at(1)) {
                (Some(dot), Some(next)) if dot.is_punct('.') && next.ident().is_some() => {
                    name.push('.');
                    name.push_str(next.ident().unwrap_or_default());
                    last = next;
                    self.pos += 2;
                }
                _ => break,
            }
        }

        Some(NameRef {
            name,
            span: LineSpan::new(
                LinePosition::new(start.line, start.column),
                LinePosition::new(last.line, last.column + last.len),
            ),
            global: alias.is_some(),
        })
    }

    fn skip_balanced(&mut self, open: char, close: char) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            self.pos += 1;
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
        }
    }

    fn skip_past(&mut self, c: char) {
        while let Some(token) = self.peek() {
            self.pos += 1;
            if token.is_punct(c) {
                return;
            }
        }
    }
}
