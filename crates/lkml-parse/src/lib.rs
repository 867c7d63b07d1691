//! Lossless parser for LookML.
//!
//! ```
//! let source = "view: sales {\n  dimension: id {\n    type: number\n  }\n}\n";
//! let document = lkml_parse::parse(source)?;
//! assert_eq!(document.to_string(), source);
//! # Ok::<(), lkml_parse::ParseError>(())
//! ```

mod error;
pub use error::{ParseError, SyntaxError};

mod diagnostic;

mod parser;
pub use parser::{ListValues, Parser, Production};

pub use lkml_cst::Document;

/// Tokenize and parse `source` into a lossless [`Document`].
pub fn parse(source: &str) -> Result<Document, ParseError> {
    let tokens = lkml_tokenizer::tokenize(source)?;
    Parser::new(tokens).parse()
}
