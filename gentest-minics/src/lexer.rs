//! Tokenizer for the mini C# dialect.

/// Kind of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Punct(char),
    /// String, char or numeric literal; contents are irrelevant to binding.
    Literal,
}

/// A token with its zero-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    pub len: usize,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_ident(&self, word: &str) -> bool {
        self.ident() == Some(word)
    }
}

/// Split source text into tokens, skipping whitespace and comments.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        chars: text.chars().collect(),
        pos: 0,
        line: 0,
        column: 0,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    tokens
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_trivia();
        let (line, column, start) = (self.line, self.column, self.pos);
        let c = self.peek()?;

        let kind = if c.is_alphabetic() || c == '_' || c == '@' {
            let mut word = String::new();
            self.bump();
            if c != '@' {
                word.push(c);
            }
            while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
                word.push(c);
                self.bump();
            }
            TokenKind::Ident(word)
        } else if c == '"' || c == '\'' {
            self.bump();
            while let Some(next) = self.bump() {
                if next == '\\' {
                    self.bump();
                } else if next == c || next == '\n' {
                    break;
                }
            }
            TokenKind::Literal
        } else if c.is_ascii_digit() {
            while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '.') {
                self.bump();
            }
            TokenKind::Literal
        } else {
            self.bump();
            TokenKind::Punct(c)
        };

        Some(Token {
            kind,
            line,
            column,
            len: self.pos - start,
        })
    }
}
