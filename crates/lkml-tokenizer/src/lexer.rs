//! Lexer for LookML source text.

use lkml_keys::{EXPR_BLOCK_LOOKAHEAD, expression_block_key};
use tracing::trace;

use crate::{LexError, Token, TokenKind};

/// Splits LookML source text into a sequence of tokens.
///
/// The lexer is a single left-to-right scan with one character of lookahead,
/// widened to [`EXPR_BLOCK_LOOKAHEAD`] characters when deciding whether a
/// key introduces an expression block.
#[derive(Clone)]
pub struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: usize,
    /// Current 1-based line.
    line: u32,
    /// Tokens emitted so far.
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the current line.
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Peek at up to `n` characters without consuming them.
    ///
    /// Returns fewer characters near the end of input, never panics.
    pub fn peek_n(&self, n: usize) -> &'src str {
        let end = self
            .remaining
            .char_indices()
            .nth(n)
            .map_or(self.remaining.len(), |(i, _)| i);
        &self.remaining[..end]
    }

    /// Consume one character and return it.
    #[inline]
    pub fn read(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.advance_by(c.len_utf8());
        Some(c)
    }

    /// Consume up to `n` characters and return them.
    pub fn read_n(&mut self, n: usize) -> &'src str {
        let chars = self.peek_n(n);
        self.advance_by(chars.len());
        chars
    }

    /// Advance by n bytes.
    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n;
        self.remaining = &self.remaining[n..];
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    /// Source text from `start` to the current position.
    #[inline]
    fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.pos]
    }

    fn push(&mut self, token: Token) {
        trace!("Token {:?} on line {}", token.kind, token.line);
        self.tokens.push(token);
    }

    /// Tokenize the whole input.
    ///
    /// The returned sequence always starts with [`TokenKind::StreamStart`] and
    /// ends with [`TokenKind::StreamEnd`].
    pub fn scan(mut self) -> Result<Vec<Token>, LexError> {
        self.push(Token::new(TokenKind::StreamStart, self.line));

        while let Some(c) = self.peek() {
            match c {
                '\n' | '\t' | ' ' | '\r' => {
                    let token = self.scan_whitespace();
                    self.push(token);
                }
                '#' => {
                    let token = self.scan_comment();
                    self.push(token);
                }
                ';' if self.starts_with(";;") => {
                    self.push(Token::new(TokenKind::ExpressionBlockEnd, self.line));
                    self.advance_by(2);
                }
                '"' => {
                    self.read();
                    let token = self.scan_quoted_literal()?;
                    self.push(token);
                }
                _ => {
                    if let Some(kind) = TokenKind::from_char(c) {
                        self.push(Token::new(kind, self.line));
                        self.read();
                    } else if let Some(key) = expression_block_key(self.peek_n(EXPR_BLOCK_LOOKAHEAD))
                    {
                        // `key:` followed by raw text up to `;;`
                        self.push(Token::new(TokenKind::Literal(key.to_string()), self.line));
                        self.advance_by(key.len());
                        self.push(Token::new(TokenKind::Colon, self.line));
                        self.read();
                        let token = self.scan_expression_block()?;
                        self.push(token);
                    } else {
                        let token = self.scan_literal();
                        self.push(token);
                    }
                }
            }
        }

        self.push(Token::new(TokenKind::StreamEnd, self.line));
        Ok(self.tokens)
    }

    /// Scan a run of whitespace.
    ///
    /// Line breaks and horizontal whitespace never share a token: a run that
    /// starts with a line break yields a [`TokenKind::Newline`] holding every
    /// consecutive line break, otherwise a [`TokenKind::Whitespace`].
    pub fn scan_whitespace(&mut self) -> Token {
        let start = self.pos;
        let line = self.line;

        if self.peek() == Some('\n') || self.starts_with("\r\n") {
            loop {
                if self.peek() == Some('\n') {
                    self.read();
                } else if self.starts_with("\r\n") {
                    self.advance_by(2);
                } else {
                    break;
                }
                self.line += 1;
            }
            return Token::new(TokenKind::Newline(self.slice_from(start).to_string()), line);
        }

        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' => {}
                '\r' if !self.starts_with("\r\n") => {}
                _ => break,
            }
            self.read();
        }
        Token::new(TokenKind::Whitespace(self.slice_from(start).to_string()), line)
    }

    /// Scan a comment starting at `#`, up to (not including) the line break.
    pub fn scan_comment(&mut self) -> Token {
        let line = self.line;
        if self.peek() == Some('#') {
            self.read();
        }
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' || self.starts_with("\r\n") {
                break;
            }
            self.read();
        }
        Token::new(TokenKind::Comment(self.slice_from(start).to_string()), line)
    }

    /// Scan raw expression text up to, but not including, the `;;` terminator.
    ///
    /// No escaping happens inside expression blocks.
    pub fn scan_expression_block(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let line = self.line;
        while !self.starts_with(";;") {
            match self.read() {
                Some('\n') => self.line += 1,
                Some(_) => {}
                None => return Err(LexError::UnterminatedExpressionBlock { line }),
            }
        }
        Ok(Token::new(
            TokenKind::ExpressionBlock(self.slice_from(start).to_string()),
            line,
        ))
    }

    /// Scan an unquoted literal.
    ///
    /// The first character is always consumed, so the scan makes progress
    /// even when it starts on an exit character.
    pub fn scan_literal(&mut self) -> Token {
        let start = self.pos;
        let line = self.line;
        self.read();
        while let Some(c) = self.peek() {
            if is_literal_exit(c) {
                break;
            }
            self.read();
        }
        Token::new(TokenKind::Literal(self.slice_from(start).to_string()), line)
    }

    /// Scan a quoted literal. The opening quote must already be consumed.
    ///
    /// A backslash escapes the character after it; the escape marker is
    /// dropped from the unescaped text. The closing quote is consumed.
    pub fn scan_quoted_literal(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let line = self.line;
        let mut unescaped = String::new();

        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedString { line }),
                Some('"') => break,
                Some('\\') => {
                    self.read();
                    let Some(escaped) = self.read() else {
                        return Err(LexError::UnterminatedString { line });
                    };
                    if escaped == '\n' {
                        self.line += 1;
                    }
                    unescaped.push(escaped);
                }
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    unescaped.push(c);
                    self.read();
                }
            }
        }

        let raw = self.slice_from(start).to_string();
        // closing quote
        self.read();
        Ok(Token::new(TokenKind::QuotedLiteral { raw, unescaped }, line))
    }
}

/// Characters that end an unquoted literal.
fn is_literal_exit(c: char) -> bool {
    matches!(
        c,
        '\0' | ' ' | '\n' | '\r' | '\t' | ':' | '}' | '{' | ',' | ']'
    )
}

/// Tokenize `source` in one call.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).scan()
}
