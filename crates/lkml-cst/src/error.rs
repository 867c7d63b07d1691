//! Tree invariant violations.

use std::fmt;

/// An error raised while constructing a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A key that may not repeat appears twice in the same nested container.
    DuplicateKey {
        /// The repeated key.
        key: String,
        /// Line of the second occurrence, if known.
        line: Option<u32>,
    },
}

impl TreeError {
    /// The 1-based line the error points at, if known.
    pub fn line(&self) -> Option<u32> {
        match self {
            TreeError::DuplicateKey { line, .. } => *line,
        }
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::DuplicateKey { key, line } => {
                write!(f, "key \"{key}\" already exists in this block")?;
                if let Some(line) = line {
                    write!(f, " (line {line})")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for TreeError {}
