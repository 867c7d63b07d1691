//! Syntax tokens: a significant value plus the trivia around it.

use std::borrow::Cow;
use std::fmt;

use crate::Visitor;

/// What a [`SyntaxToken`] represents, and how its value is written out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Unquoted literal, written as-is.
    Literal,
    /// Quoted literal.
    Quoted {
        /// Original text between the quotes, escapes untouched. When absent the
        /// value is re-escaped on output.
        raw: Option<String>,
    },
    /// Expression block value, written as `expr_prefix value expr_suffix ;;`.
    Expression {
        /// Whitespace between the colon and the expression.
        expr_prefix: String,
        /// Whitespace between the expression and `;;`.
        expr_suffix: String,
    },
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `{`
    BraceOpen,
    /// `}`
    BraceClose,
    /// `[`
    BracketOpen,
    /// `]`
    BracketClose,
}

impl SyntaxKind {
    /// The fixed text of a punctuation kind.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            SyntaxKind::Colon => Some(":"),
            SyntaxKind::Comma => Some(","),
            SyntaxKind::BraceOpen => Some("{"),
            SyntaxKind::BraceClose => Some("}"),
            SyntaxKind::BracketOpen => Some("["),
            SyntaxKind::BracketClose => Some("]"),
            SyntaxKind::Literal | SyntaxKind::Quoted { .. } | SyntaxKind::Expression { .. } => {
                None
            }
        }
    }
}

/// A value together with its leading and trailing trivia.
///
/// Writing out `prefix`, the formatted value, and `suffix` for every token of
/// a tree in order reproduces the parsed source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxToken {
    /// How the value is written.
    pub kind: SyntaxKind,
    /// The semantic value: literal text, unescaped string, or trimmed expression.
    pub value: String,
    /// Trivia written before the value.
    pub prefix: String,
    /// Trivia written after the value.
    pub suffix: String,
    /// Source line, absent for tokens built programmatically.
    pub line: Option<u32>,
}

impl SyntaxToken {
    /// Create a token with no trivia.
    pub fn new(kind: SyntaxKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            prefix: String::new(),
            suffix: String::new(),
            line: None,
        }
    }

    /// An unquoted literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(SyntaxKind::Literal, value)
    }

    /// A quoted literal that is escaped on output.
    pub fn quoted(value: impl Into<String>) -> Self {
        Self::new(SyntaxKind::Quoted { raw: None }, value)
    }

    /// A quoted literal that keeps its original escaping.
    pub fn quoted_raw(value: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::new(
            SyntaxKind::Quoted {
                raw: Some(raw.into()),
            },
            value,
        )
    }

    /// An expression block with a single space before `;;`.
    pub fn expression(value: impl Into<String>) -> Self {
        Self::new(
            SyntaxKind::Expression {
                expr_prefix: String::new(),
                expr_suffix: " ".to_string(),
            },
            value,
        )
    }

    /// An expression block split from its raw source text.
    ///
    /// Leading and trailing whitespace of `text` is kept apart from the value.
    pub fn expression_from_source(text: &str) -> Self {
        let rest = text.trim_start();
        let value = rest.trim_end();
        let expr_prefix = &text[..text.len() - rest.len()];
        let expr_suffix = &rest[value.len()..];
        Self::new(
            SyntaxKind::Expression {
                expr_prefix: expr_prefix.to_string(),
                expr_suffix: expr_suffix.to_string(),
            },
            value,
        )
    }

    /// A colon followed by a single space.
    pub fn colon() -> Self {
        Self::punct(SyntaxKind::Colon).with_suffix(" ")
    }

    /// A bare comma.
    pub fn comma() -> Self {
        Self::punct(SyntaxKind::Comma)
    }

    /// A bare `{`.
    pub fn brace_open() -> Self {
        Self::punct(SyntaxKind::BraceOpen)
    }

    /// A bare `}`.
    pub fn brace_close() -> Self {
        Self::punct(SyntaxKind::BraceClose)
    }

    /// A bare `[`.
    pub fn bracket_open() -> Self {
        Self::punct(SyntaxKind::BracketOpen)
    }

    /// A bare `]`.
    pub fn bracket_close() -> Self {
        Self::punct(SyntaxKind::BracketClose)
    }

    /// A punctuation token whose value is its symbol.
    pub fn punct(kind: SyntaxKind) -> Self {
        let value = kind.symbol().unwrap_or_default();
        Self::new(kind, value)
    }

    /// Replace the leading trivia.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replace the trailing trivia.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the source line.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Whether this token is a quoted literal.
    pub fn is_quoted(&self) -> bool {
        matches!(self.kind, SyntaxKind::Quoted { .. })
    }

    /// Whether this token is an expression block.
    pub fn is_expression(&self) -> bool {
        matches!(self.kind, SyntaxKind::Expression { .. })
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_token(self)
    }

    /// The value as written in source, without trivia.
    pub fn format_value(&self) -> Cow<'_, str> {
        match &self.kind {
            SyntaxKind::Literal => Cow::Borrowed(&self.value),
            SyntaxKind::Quoted { raw: Some(raw) } => Cow::Owned(format!("\"{raw}\"")),
            SyntaxKind::Quoted { raw: None } => Cow::Owned(format!("\"{}\"", escape(&self.value))),
            SyntaxKind::Expression {
                expr_prefix,
                expr_suffix,
            } => Cow::Owned(format!("{expr_prefix}{}{expr_suffix};;", self.value)),
            kind => Cow::Borrowed(kind.symbol().unwrap_or_default()),
        }
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)?;
        f.write_str(&self.format_value())?;
        f.write_str(&self.suffix)
    }
}

/// Escape backslashes and double quotes for a quoted literal.
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '"']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_with_trivia() {
        let token = SyntaxToken::literal("yes").with_prefix(" ").with_suffix("\n");
        assert_eq!(token.to_string(), " yes\n");
    }

    #[test]
    fn test_quoted_escapes_on_output() {
        let token = SyntaxToken::quoted(r#"#.### "M""#);
        assert_eq!(token.to_string(), r##""#.### \"M\"""##);
        let token = SyntaxToken::quoted(r"C:\temp");
        assert_eq!(token.to_string(), r#""C:\\temp""#);
    }

    #[test]
    fn test_quoted_raw_is_kept() {
        // `\d` unescapes to `d`, so only the raw text can reproduce it.
        let token = SyntaxToken::quoted_raw("d+", r"\d+");
        assert_eq!(token.to_string(), r#""\d+""#);
    }

    #[test]
    fn test_expression_default() {
        let token = SyntaxToken::expression("${TABLE}.id").with_prefix(" ");
        assert_eq!(token.to_string(), " ${TABLE}.id ;;");
    }

    #[test]
    fn test_expression_from_source() {
        let token = SyntaxToken::expression_from_source("  concat(${a.b}, '|')\n  ");
        assert_eq!(token.value, "concat(${a.b}, '|')");
        assert_eq!(
            token.kind,
            SyntaxKind::Expression {
                expr_prefix: "  ".into(),
                expr_suffix: "\n  ".into(),
            }
        );
        assert_eq!(token.to_string(), "  concat(${a.b}, '|')\n  ;;");
    }

    #[test]
    fn test_expression_from_blank_source() {
        let token = SyntaxToken::expression_from_source("  ");
        assert_eq!(token.value, "");
        assert_eq!(token.to_string(), "  ;;");
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(SyntaxToken::colon().to_string(), ": ");
        assert_eq!(SyntaxToken::comma().to_string(), ",");
        assert_eq!(SyntaxToken::brace_open().with_prefix(" ").to_string(), " {");
        assert_eq!(SyntaxToken::bracket_close().value, "]");
    }
}
