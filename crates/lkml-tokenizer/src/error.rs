//! Errors raised while scanning.

use std::fmt;

/// A fatal lexing error. Scanning stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A quoted literal reached the end of input before its closing quote.
    UnterminatedString {
        /// Line of the opening quote.
        line: u32,
    },
    /// An expression block reached the end of input before `;;`.
    UnterminatedExpressionBlock {
        /// Line where the expression starts.
        line: u32,
    },
}

impl LexError {
    /// The 1-based line the error points at.
    pub fn line(&self) -> u32 {
        match self {
            LexError::UnterminatedString { line }
            | LexError::UnterminatedExpressionBlock { line } => *line,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnterminatedString { line } => {
                write!(f, "unterminated string literal on line {line}")
            }
            LexError::UnterminatedExpressionBlock { line } => {
                write!(f, "expression block on line {line} is missing its closing ';;'")
            }
        }
    }
}

impl std::error::Error for LexError {}
