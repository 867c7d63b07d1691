//! Parse errors.

use std::fmt;

use lkml_cst::TreeError;
use lkml_tokenizer::LexError;

/// The token sequence matched no grammar production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// What went wrong, without the location.
    pub message: String,
    /// 1-based line of the farthest token the parser reached.
    pub line: u32,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: u32) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on line {}", self.message, self.line)
    }
}

impl std::error::Error for SyntaxError {}

/// Any error raised while turning source text into a [`lkml_cst::Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The source could not be tokenized.
    Lex(LexError),
    /// The tokens do not form a valid document.
    Syntax(SyntaxError),
    /// A node violated a tree invariant, such as a repeated key.
    Tree(TreeError),
}

impl ParseError {
    /// The 1-based line the error points at, if known.
    pub fn line(&self) -> Option<u32> {
        match self {
            ParseError::Lex(e) => Some(e.line()),
            ParseError::Syntax(e) => Some(e.line),
            ParseError::Tree(e) => e.line(),
        }
    }

    /// Short description used as the diagnostic title.
    pub(crate) fn title(&self) -> &'static str {
        match self {
            ParseError::Lex(LexError::UnterminatedString { .. }) => "unterminated string",
            ParseError::Lex(LexError::UnterminatedExpressionBlock { .. }) => {
                "unterminated expression block"
            }
            ParseError::Syntax(_) => "syntax error",
            ParseError::Tree(TreeError::DuplicateKey { .. }) => "duplicate key",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{e}"),
            ParseError::Syntax(e) => write!(f, "{e}"),
            ParseError::Tree(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(e) => Some(e),
            ParseError::Syntax(e) => Some(e),
            ParseError::Tree(e) => Some(e),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

impl From<SyntaxError> for ParseError {
    fn from(e: SyntaxError) -> Self {
        ParseError::Syntax(e)
    }
}

impl From<TreeError> for ParseError {
    fn from(e: TreeError) -> Self {
        ParseError::Tree(e)
    }
}
