//! Diagnostic rendering for parse errors.

use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};
use lkml_cst::TreeError;
use lkml_tokenizer::LexError;

use crate::ParseError;

impl ParseError {
    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let range = line_range(source, self.line().unwrap_or(1));
        let report = self.build_report(filename, range);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        range: Range<usize>,
    ) -> ariadne::ReportBuilder<'static, (&'a str, Range<usize>)> {
        let report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(self.title());

        match self {
            ParseError::Lex(LexError::UnterminatedString { .. }) => report
                .with_label(
                    Label::new((filename, range))
                        .with_message("string starts here")
                        .with_color(Color::Red),
                )
                .with_help("add a closing '\"'"),
            ParseError::Lex(LexError::UnterminatedExpressionBlock { .. }) => report
                .with_label(
                    Label::new((filename, range))
                        .with_message("expression starts here")
                        .with_color(Color::Red),
                )
                .with_help("end the expression with ';;'"),
            ParseError::Syntax(e) => report.with_label(
                Label::new((filename, range))
                    .with_message(&e.message)
                    .with_color(Color::Red),
            ),
            ParseError::Tree(TreeError::DuplicateKey { key, .. }) => report
                .with_label(
                    Label::new((filename, range))
                        .with_message(format!("`{key}` is repeated here"))
                        .with_color(Color::Red),
                )
                .with_help("only pluralizable keys such as `dimension` may repeat inside a block"),
        }
    }
}

/// Character range of a 1-based line, without its line break.
///
/// Lines past the end of the source map to an empty range at the end.
fn line_range(source: &str, line: u32) -> Range<usize> {
    let mut start = 0;
    for (number, text) in (1..).zip(source.split_inclusive('\n')) {
        if number == line {
            let text = text.trim_end_matches(['\n', '\r']);
            let first = source[..start].chars().count();
            return first..first + text.chars().count();
        }
        start += text.len();
    }
    let end = source.chars().count();
    end..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn render(source: &str) -> String {
        let err = parse(source).unwrap_err();
        let rendered = err.render("test.lkml", source);
        String::from_utf8(strip_ansi_escapes::strip(rendered.as_bytes())).unwrap()
    }

    #[test]
    fn test_line_range() {
        let source = "a: b\r\nc: d\n\ne";
        assert_eq!(line_range(source, 1), 0..4);
        assert_eq!(line_range(source, 2), 6..10);
        assert_eq!(line_range(source, 3), 11..11);
        assert_eq!(line_range(source, 4), 12..13);
        assert_eq!(line_range(source, 9), 13..13);
    }

    #[test]
    fn test_line_range_counts_chars() {
        assert_eq!(line_range("é: ü\nx: y", 2), 5..9);
    }

    #[test]
    fn test_syntax_error_diagnostic() {
        let output = render("view: a {\n  fields: [a b]\n}");
        assert!(output.contains("syntax error"), "{output}");
        assert!(output.contains("Expected a comma between list values"), "{output}");
        assert!(output.contains("test.lkml"), "{output}");
        assert!(output.contains("fields: [a b]"), "{output}");
    }

    #[test]
    fn test_duplicate_key_diagnostic() {
        let output = render("view: a {\n  label: \"x\"\n  label: \"y\"\n}");
        assert!(output.contains("duplicate key"), "{output}");
        assert!(output.contains("`label` is repeated here"), "{output}");
        assert!(output.contains("label: \"y\""), "{output}");
    }

    #[test]
    fn test_unterminated_string_diagnostic() {
        let output = render("label: \"oops\n");
        assert!(output.contains("unterminated string"), "{output}");
        assert!(output.contains("add a closing"), "{output}");
    }
}
