//! Plain value view of LookML documents.
//!
//! [`load`] parses source text and projects it into a [`Value`]; [`dump`]
//! builds a syntax tree from a [`Value`] and writes it back out as text.
//!
//! ```
//! let value = lkml_tree::load("view: orders {\n  dimension: id {}\n}")?;
//! assert_eq!(
//!     value.get("views[0].dimensions[0].name").and_then(lkml_tree::Value::as_str),
//!     Some("id")
//! );
//! assert_eq!(lkml_tree::dump(&value)?, "view: orders {\n  dimension: id {}\n}");
//! # Ok::<(), lkml_tree::Error>(())
//! ```

use std::fmt;

mod builder;
mod json;
mod project;
mod value;

pub use builder::{BuildError, BuildOptions, DocumentBuilder};
pub use lkml_parse::ParseError;
pub use project::{ProjectionError, ValueVisitor};
pub use value::{Entry, Object, Value};

/// Error from [`load`] or [`dump`].
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Projection(ProjectionError),
    Build(BuildError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{err}"),
            Error::Projection(err) => write!(f, "{err}"),
            Error::Build(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Projection(err) => Some(err),
            Error::Build(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<ProjectionError> for Error {
    fn from(err: ProjectionError) -> Self {
        Error::Projection(err)
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Error::Build(err)
    }
}

/// Parse `source` and project it into a plain value.
pub fn load(source: &str) -> Result<Value, Error> {
    let document = lkml_parse::parse(source)?;
    Ok(document.accept(&mut ValueVisitor::new())?)
}

/// Write a plain value out as LookML with the default layout.
pub fn dump(value: &Value) -> Result<String, Error> {
    dump_with(value, BuildOptions::default())
}

/// Write a plain value out as LookML.
pub fn dump_with(value: &Value, options: BuildOptions) -> Result<String, Error> {
    let document = DocumentBuilder::with_options(options).build(value)?;
    Ok(document.to_string())
}
