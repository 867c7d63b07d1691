//! A lexer for LookML

mod error;
pub use error::LexError;

mod token;
pub use token::{Token, TokenKind};

mod lexer;
pub use lexer::{Lexer, tokenize};
