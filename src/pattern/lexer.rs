//! Lexer for `source` path patterns.

use crate::error::{Error, Result};

/// Token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type of token.
    pub kind: TokenKind,
    /// Character offset (0-indexed).
    pub position: usize,
}

/// Types of tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `*`, `+` or `?`.
    Modifier(char),
    /// A backslash-escaped character (the backslash is dropped).
    Escaped(char),
    /// `{`
    Open,
    /// `}`
    Close,
    /// `:name`
    Name(String),
    /// Body of a capturing `( ... )` group.
    Pattern(String),
    /// A `(?...)` group, including its parentheses, copied through as written.
    Raw(String),
    /// Any other character.
    Char(char),
    /// End of input.
    End,
}

/// Lexer for path patterns such as `/blog/:slug*` or `/feedback/((?!general).*)`.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
    in_bracket: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
            in_bracket: false,
        }
    }

    /// Tokenize the whole input. The last token is always [`TokenKind::End`].
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while self.pos < self.chars.len() {
            tokens.push(self.next_token()?);
        }
        tokens.push(Token {
            kind: TokenKind::End,
            position: self.pos,
        });
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        let position = self.pos;
        let c = self.chars[self.pos];

        let kind = match c {
            '*' | '+' | '?' => {
                self.pos += 1;
                TokenKind::Modifier(c)
            }
            '\\' => {
                self.pos += 1;
                match self.chars.get(self.pos) {
                    Some(&escaped) => {
                        self.pos += 1;
                        TokenKind::Escaped(escaped)
                    }
                    None => return Err(self.error(position, "Trailing escape character")),
                }
            }
            '{' => {
                self.pos += 1;
                TokenKind::Open
            }
            '}' => {
                self.pos += 1;
                TokenKind::Close
            }
            ':' => {
                if self.in_bracket {
                    return Err(self.error(position, "Ambiguous ':' inside character class"));
                }
                TokenKind::Name(self.read_name(position)?)
            }
            '(' => self.read_group(position)?,
            _ => {
                match c {
                    '[' => self.in_bracket = true,
                    ']' => self.in_bracket = false,
                    _ => {}
                }
                self.pos += 1;
                TokenKind::Char(c)
            }
        };

        Ok(Token { kind, position })
    }

    /// Read a parameter name after `:`.
    fn read_name(&mut self, position: usize) -> Result<String> {
        let mut name = String::new();
        self.pos += 1;
        while let Some(&c) = self.chars.get(self.pos) {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }

        if name.is_empty() {
            return Err(self.error(position, "Missing parameter name"));
        }
        Ok(name)
    }

    /// Read a parenthesized group starting at `(`.
    fn read_group(&mut self, position: usize) -> Result<TokenKind> {
        let raw = self.chars.get(position + 1) == Some(&'?');
        let mut depth = 1;
        let mut body = String::new();
        self.pos = position + 1;

        while let Some(&c) = self.chars.get(self.pos) {
            if c == '\\' {
                body.push(c);
                self.pos += 1;
                if let Some(&escaped) = self.chars.get(self.pos) {
                    body.push(escaped);
                    self.pos += 1;
                }
                continue;
            }

            if c == ')' {
                depth -= 1;
                if depth == 0 {
                    self.pos += 1;
                    break;
                }
            } else if c == '(' {
                depth += 1;
                if self.chars.get(self.pos + 1) != Some(&'?') {
                    return Err(self.error(self.pos, "Capturing groups are not allowed"));
                }
            }

            body.push(c);
            self.pos += 1;
        }

        if depth > 0 {
            return Err(self.error(position, "Unbalanced pattern"));
        }
        if body.is_empty() {
            return Err(self.error(position, "Missing pattern"));
        }

        if raw {
            Ok(TokenKind::Raw(format!("({})", body)))
        } else {
            Ok(TokenKind::Pattern(body))
        }
    }

    fn error(&self, position: usize, message: &str) -> Error {
        Error::pattern(self.input, position, message)
    }
}
