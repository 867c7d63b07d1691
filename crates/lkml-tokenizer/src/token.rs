//! Token types for the LookML lexer.

use std::borrow::Cow;
use std::fmt;

/// The kind of a token, together with the text it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Stream boundaries
    /// Start of the token stream.
    StreamStart,
    /// End of the token stream.
    StreamEnd,

    // Trivia
    /// Horizontal whitespace: spaces, tabs, stray carriage returns.
    Whitespace(String),
    /// One or more consecutive line breaks (`\n` or `\r\n`).
    Newline(String),
    /// Comment text following the `#` marker, up to the end of the line.
    Comment(String),

    // Values
    /// Unquoted literal: `number`, `yes`, `${TABLE}.id`
    Literal(String),
    /// Quoted literal: `"Total Revenue"`
    QuotedLiteral {
        /// Source text between the quotes, escapes untouched.
        raw: String,
        /// Text with one level of backslash escapes removed.
        unescaped: String,
    },
    /// Raw expression text following an expression-block key.
    ExpressionBlock(String),
    /// `;;`
    ExpressionBlockEnd,

    // Structural tokens
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `{`
    BlockStart,
    /// `}`
    BlockEnd,
    /// `[`
    ListStart,
    /// `]`
    ListEnd,
}

impl TokenKind {
    /// Maps a single structural character to its token kind.
    pub fn from_char(c: char) -> Option<TokenKind> {
        let kind = match c {
            '{' => TokenKind::BlockStart,
            '}' => TokenKind::BlockEnd,
            '[' => TokenKind::ListStart,
            ']' => TokenKind::ListEnd,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::ExpressionBlockEnd,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this token is trivia (whitespace, line breaks, or comments).
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace(_) | TokenKind::Newline(_) | TokenKind::Comment(_)
        )
    }

    /// Whether this token is trivia that may trail a value on its own line
    /// (line breaks and comments, but not horizontal whitespace).
    pub fn is_line_trivia(&self) -> bool {
        matches!(self, TokenKind::Newline(_) | TokenKind::Comment(_))
    }

    /// The text value carried by this token, if any.
    ///
    /// Quoted literals yield their unescaped text.
    pub fn value(&self) -> Option<&str> {
        match self {
            TokenKind::Whitespace(text)
            | TokenKind::Newline(text)
            | TokenKind::Comment(text)
            | TokenKind::Literal(text)
            | TokenKind::ExpressionBlock(text) => Some(text),
            TokenKind::QuotedLiteral { unescaped, .. } => Some(unescaped),
            _ => None,
        }
    }

    /// The exact source text this token was scanned from.
    pub fn source_text(&self) -> Cow<'_, str> {
        match self {
            TokenKind::StreamStart | TokenKind::StreamEnd => Cow::Borrowed(""),
            TokenKind::Whitespace(text)
            | TokenKind::Newline(text)
            | TokenKind::Literal(text)
            | TokenKind::ExpressionBlock(text) => Cow::Borrowed(text),
            TokenKind::Comment(text) => Cow::Owned(format!("#{text}")),
            TokenKind::QuotedLiteral { raw, .. } => Cow::Owned(format!("\"{raw}\"")),
            TokenKind::ExpressionBlockEnd => Cow::Borrowed(";;"),
            TokenKind::Colon => Cow::Borrowed(":"),
            TokenKind::Comma => Cow::Borrowed(","),
            TokenKind::BlockStart => Cow::Borrowed("{"),
            TokenKind::BlockEnd => Cow::Borrowed("}"),
            TokenKind::ListStart => Cow::Borrowed("["),
            TokenKind::ListEnd => Cow::Borrowed("]"),
        }
    }

    /// Short human-readable name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::StreamStart => "stream start",
            TokenKind::StreamEnd => "end of stream",
            TokenKind::Whitespace(_) => "whitespace",
            TokenKind::Newline(_) => "newline",
            TokenKind::Comment(_) => "comment",
            TokenKind::Literal(_) => "literal",
            TokenKind::QuotedLiteral { .. } => "quoted literal",
            TokenKind::ExpressionBlock(_) => "expression block",
            TokenKind::ExpressionBlockEnd => "';;'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::BlockStart => "'{'",
            TokenKind::BlockEnd => "'}'",
            TokenKind::ListStart => "'['",
            TokenKind::ListEnd => "']'",
        }
    }
}

/// A token with its kind and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Line number where the token begins.
    pub line: u32,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, line: u32) -> Self {
        Self { kind, line }
    }

    /// The text value carried by this token, if any.
    pub fn value(&self) -> Option<&str> {
        self.kind.value()
    }

    /// The exact source text this token was scanned from.
    pub fn source_text(&self) -> Cow<'_, str> {
        self.kind.source_text()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Literal(text) | TokenKind::ExpressionBlock(text) => {
                write!(f, "{} '{}'", self.kind.name(), text.trim())
            }
            TokenKind::QuotedLiteral { raw, .. } => write!(f, "{} \"{}\"", self.kind.name(), raw),
            kind => f.write_str(kind.name()),
        }
    }
}
