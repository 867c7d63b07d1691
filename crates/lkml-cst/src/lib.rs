//! Lossless syntax tree for LookML.
//!
//! Every significant token is a [`SyntaxToken`] carrying the whitespace and
//! comments around it, so writing a tree back out with [`ToString`] gives the
//! exact text it was parsed from.
//!
//! ```
//! use lkml_cst::{Block, Container, Document, Pair, SyntaxToken};
//!
//! let dimension = Block::new(
//!     SyntaxToken::literal("dimension"),
//!     Some(SyntaxToken::literal("id").with_suffix(" ")),
//!     Container::new(
//!         vec![Pair::new(SyntaxToken::literal("type"), SyntaxToken::literal("number")).into()],
//!         false,
//!     )?,
//! );
//! let document = Document::new(Container::new(vec![dimension.into()], true)?);
//! assert_eq!(document.to_string(), "dimension: id {type: number}");
//! # Ok::<(), lkml_cst::TreeError>(())
//! ```

mod error;
pub use error::TreeError;

mod token;
pub use token::{SyntaxKind, SyntaxToken, escape};

mod node;
pub use node::{Block, Container, Document, Item, List, ListItems, Pair};

pub mod visit;
pub use visit::{Fold, Visit, Visitor};
