//! Syntax tree builder from plain values.

use lkml_cst::{Block, Container, Document, Item, List, ListItems, Pair, SyntaxToken, TreeError};
use lkml_keys::{
    has_name_field, is_expression_block_key, is_plural_key, is_quoted_literal_key, singularize,
};
use tracing::trace;

use crate::{Object, Value};

/// Error during tree building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The root value is not an object.
    RootNotObject { kind: &'static str },
    /// A value that has no LookML form, such as a list nested in a list.
    UnsupportedValue { key: String, kind: &'static str },
    /// A key, block name, or expression that would not read back as written.
    UnwritableText { key: String, text: String },
    /// The built tree violates a container invariant.
    Tree(TreeError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::RootNotObject { kind } => {
                write!(f, "expected an object at the root, found a {kind}")
            }
            BuildError::UnsupportedValue { key, kind } => {
                write!(f, "cannot write a {kind} value for key \"{key}\"")
            }
            BuildError::UnwritableText { key, text } => {
                write!(f, "cannot write \"{text}\" for key \"{key}\"")
            }
            BuildError::Tree(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Tree(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TreeError> for BuildError {
    fn from(err: TreeError) -> Self {
        BuildError::Tree(err)
    }
}

/// Layout settings for built documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Indentation for one nesting level.
    pub indent: String,
    /// Lists with more items than this are written one item per line.
    pub list_threshold: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            list_threshold: 5,
        }
    }
}

/// The last node written at the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Previous {
    Document,
    Opened,
    Block,
    Pair,
    List,
}

/// Builder that turns a plain [`Value`] into a [`Document`].
///
/// This is the inverse of [`ValueVisitor`](crate::ValueVisitor): lists under
/// plural keys expand into repeated siblings, objects become blocks, and
/// strings become pairs. Output is laid out with [`BuildOptions`], with a
/// blank line before every block that follows a sibling.
pub struct DocumentBuilder {
    options: BuildOptions,
    parent_key: Option<String>,
    level: usize,
    previous: Previous,
}

impl DocumentBuilder {
    /// Create a builder with default layout.
    pub fn new() -> Self {
        Self::with_options(BuildOptions::default())
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            parent_key: None,
            level: 0,
            previous: Previous::Document,
        }
    }

    /// Build a document from a root object.
    pub fn build(&mut self, value: &Value) -> Result<Document, BuildError> {
        let Value::Object(root) = value else {
            return Err(BuildError::RootNotObject { kind: value.kind() });
        };
        self.parent_key = None;
        self.level = 0;
        self.previous = Previous::Document;

        let items = self.build_items(root, None)?;
        Ok(Document::new(Container::new(items, true)?))
    }

    fn newline_indent(&self) -> String {
        format!("\n{}", self.options.indent.repeat(self.level))
    }

    fn prefix(&self) -> String {
        match self.previous {
            Previous::Document => String::new(),
            Previous::Block => format!("\n{}", self.newline_indent()),
            Previous::Opened | Previous::Pair | Previous::List => self.newline_indent(),
        }
    }

    /// Whether a list under `key` stands for repeated siblings.
    fn is_plural(&self, key: &str) -> bool {
        let singular = singularize(key);
        if !is_plural_key(&singular) {
            return false;
        }
        let parent = self.parent_key.as_deref();
        if singular == "allowed_value"
            && parent.is_some_and(|parent| parent.trim_end_matches('s') == "access_grant")
        {
            return false;
        }
        !(parent == Some("query") && singular != "filters")
    }

    fn build_items(
        &mut self,
        object: &Object,
        skip: Option<&str>,
    ) -> Result<Vec<Item>, BuildError> {
        let mut items = Vec::with_capacity(object.len());
        for (key, value) in object.iter() {
            if skip == Some(key) {
                continue;
            }
            self.build_any(key, value, &mut items)?;
        }
        Ok(items)
    }

    fn build_any(
        &mut self,
        key: &str,
        value: &Value,
        out: &mut Vec<Item>,
    ) -> Result<(), BuildError> {
        match value {
            Value::String(text) => out.push(self.build_pair(key, text)?.into()),
            Value::List(values) if self.is_plural(key) => self.expand_list(key, values, out)?,
            Value::List(values) => out.push(self.build_list(key, values)?.into()),
            Value::Object(object) => {
                let name = if has_name_field(key) {
                    None
                } else {
                    object.get("name").and_then(Value::as_str)
                };
                out.push(self.build_block(key, name, object)?.into());
            }
        }
        Ok(())
    }

    fn expand_list(
        &mut self,
        key: &str,
        values: &[Value],
        out: &mut Vec<Item>,
    ) -> Result<(), BuildError> {
        let singular = singularize(key);
        trace!(key, singular = %singular, count = values.len(), "expanding plural key");
        if singular == "filters" {
            return self.resolve_filters(values, out);
        }
        for value in values {
            self.build_any(&singular, value, out)?;
        }
        Ok(())
    }

    /// Pick a form for the values gathered under `filters__all`.
    ///
    /// Objects with a `name` are `filter` blocks, objects with a `field` are
    /// anonymous `filters` blocks, other objects are the pairs of one list.
    fn resolve_filters(
        &mut self,
        values: &[Value],
        out: &mut Vec<Item>,
    ) -> Result<(), BuildError> {
        let first = values.first().and_then(Value::as_object);
        if let Some(first) = first
            && (first.contains_key("name") || first.contains_key("field"))
        {
            let named = first.contains_key("name");
            for value in values {
                let Value::Object(object) = value else {
                    return Err(unsupported("filters", value));
                };
                let block = if named {
                    let name = object.get("name").and_then(Value::as_str);
                    self.build_block("filter", name, object)?
                } else {
                    self.build_block("filters", None, object)?
                };
                out.push(block.into());
            }
            return Ok(());
        }
        if first.is_some() {
            out.push(self.build_list("filters", values)?.into());
            return Ok(());
        }
        for value in values {
            match value {
                Value::List(items) => out.push(self.build_list("filters", items)?.into()),
                Value::String(text) => out.push(self.build_pair("filters", text)?.into()),
                Value::Object(_) => return Err(unsupported("filters", value)),
            }
        }
        Ok(())
    }

    fn build_token(&self, key: &str, text: &str, force_quote: bool) -> SyntaxToken {
        if force_quote || is_quoted_literal_key(key) {
            SyntaxToken::quoted(text)
        } else if is_expression_block_key(key) {
            SyntaxToken::expression(text.trim())
        } else if is_bare_literal(text) {
            SyntaxToken::literal(text)
        } else {
            SyntaxToken::quoted(text)
        }
    }

    fn build_pair(&mut self, key: &str, text: &str) -> Result<Pair, BuildError> {
        let force_quote = self.parent_key.as_deref() == Some("filters") && key != "field";
        let value = self.build_token(key, text, force_quote);
        if value.is_expression() && text.contains(";;") {
            return Err(unwritable(key, text));
        }
        let pair = Pair::new(literal(key, key)?.with_prefix(self.prefix()), value);
        self.previous = Previous::Pair;
        Ok(pair)
    }

    fn build_list(&mut self, key: &str, values: &[Value]) -> Result<List, BuildError> {
        let force_quote = self.parent_key.as_deref() == Some("filters") && key != "field";
        let key_token = literal(key, key)?.with_prefix(self.prefix());
        let parent = self.parent_key.replace(key.to_string());
        let pair_mode = values.iter().any(|value| value.as_object().is_some());
        let multiline = pair_mode || values.len() > self.options.list_threshold;

        if multiline {
            self.level += 1;
            self.previous = Previous::Opened;
        }
        let items = if pair_mode {
            self.list_pairs(key, values).map(ListItems::Pairs)
        } else {
            self.list_values(key, values, force_quote, multiline)
                .map(ListItems::Values)
        };
        if multiline {
            self.level -= 1;
        }
        self.parent_key = parent;
        let items = items?;

        let mut list = List::new(key_token, items);
        if multiline {
            list.separators = (1..list.len()).map(|_| SyntaxToken::comma()).collect();
            list.trailing_comma = (!list.is_empty()).then(SyntaxToken::comma);
            list.close = SyntaxToken::bracket_close().with_prefix(self.newline_indent());
        }
        self.previous = Previous::List;
        Ok(list)
    }

    fn list_pairs(&mut self, key: &str, values: &[Value]) -> Result<Vec<Pair>, BuildError> {
        let mut pairs = Vec::new();
        for value in values {
            let Value::Object(object) = value else {
                return Err(unsupported(key, value));
            };
            for (field, value) in object.iter() {
                let Value::String(text) = value else {
                    return Err(unsupported(field, value));
                };
                pairs.push(self.build_pair(field, text)?);
            }
        }
        Ok(pairs)
    }

    fn list_values(
        &self,
        key: &str,
        values: &[Value],
        force_quote: bool,
        multiline: bool,
    ) -> Result<Vec<SyntaxToken>, BuildError> {
        values
            .iter()
            .map(|value| {
                let Value::String(text) = value else {
                    return Err(unsupported(key, value));
                };
                let token = match self.build_token(key, text, force_quote) {
                    token if token.is_expression() => SyntaxToken::quoted(text),
                    token => token,
                };
                Ok(if multiline {
                    token.with_prefix(self.newline_indent())
                } else {
                    token
                })
            })
            .collect()
    }

    fn build_block(
        &mut self,
        key: &str,
        name: Option<&str>,
        object: &Object,
    ) -> Result<Block, BuildError> {
        let key_token = literal(key, key)?;
        let name = name.map(|name| literal(key, name)).transpose()?;
        let previous = self.previous;
        let parent = self.parent_key.replace(key.to_string());
        self.level += 1;
        self.previous = Previous::Opened;
        let items = self.build_items(object, name.as_ref().map(|_| "name"));
        self.level -= 1;
        self.previous = previous;
        self.parent_key = parent;
        let container = Container::new(items?, false)?;

        let prefix = match previous {
            Previous::Document | Previous::Opened => self.prefix(),
            Previous::Block | Previous::Pair | Previous::List => {
                format!("\n{}", self.newline_indent())
            }
        };
        let has_items = !container.is_empty();
        let mut block = Block::new(key_token.with_prefix(prefix), name, container);
        if block.name.is_some() {
            block.open = SyntaxToken::brace_open().with_prefix(" ");
        }
        if has_items {
            block.close = SyntaxToken::brace_close().with_prefix(self.newline_indent());
        }
        self.previous = Previous::Block;
        Ok(block)
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn unsupported(key: &str, value: &Value) -> BuildError {
    BuildError::UnsupportedValue {
        key: key.to_string(),
        kind: value.kind(),
    }
}

fn unwritable(key: &str, text: &str) -> BuildError {
    BuildError::UnwritableText {
        key: key.to_string(),
        text: text.to_string(),
    }
}

/// A key or block name token, if `text` can stand unquoted.
fn literal(key: &str, text: &str) -> Result<SyntaxToken, BuildError> {
    if is_bare_literal(text) {
        Ok(SyntaxToken::literal(text))
    } else {
        Err(unwritable(key, text))
    }
}

/// Whether `text` lexes back as a single unquoted literal.
fn is_bare_literal(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with(['"', '#', ';'])
        && !text.contains(|c: char| {
            c.is_whitespace() || matches!(c, '\0' | ':' | '{' | '}' | '[' | ']' | ',' | '"')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj<const N: usize>(entries: [(&str, Value); N]) -> Value {
        Value::Object(entries.into_iter().collect())
    }

    fn list<const N: usize>(items: [&str; N]) -> Value {
        Value::List(items.into_iter().map(Value::string).collect())
    }

    fn dump(value: &Value) -> String {
        DocumentBuilder::new().build(value).unwrap().to_string()
    }

    #[test]
    fn test_view_with_dimensions() {
        let value = obj([(
            "views",
            Value::List(vec![obj([
                ("sql_table_name", Value::string("schema.orders")),
                (
                    "dimensions",
                    Value::List(vec![
                        obj([
                            ("type", Value::string("number")),
                            ("sql", Value::string("${TABLE}.id ")),
                            ("name", Value::string("id")),
                        ]),
                        obj([
                            ("label", Value::string("Status")),
                            ("name", Value::string("status")),
                        ]),
                    ]),
                ),
                ("name", Value::string("orders")),
            ])]),
        )]);
        insta::assert_snapshot!(dump(&value), @r#"
        view: orders {
          sql_table_name: schema.orders ;;

          dimension: id {
            type: number
            sql: ${TABLE}.id ;;
          }

          dimension: status {
            label: "Status"
          }
        }
        "#);
    }

    #[test]
    fn test_short_list_single_line() {
        let value = obj([("fields", list(["a", "b", "c"]))]);
        assert_eq!(dump(&value), "fields: [a, b, c]");
    }

    #[test]
    fn test_long_list_multiline() {
        let value = obj([(
            "dimension_group",
            obj([
                ("timeframes", list(["raw", "time", "date", "week", "month", "year"])),
                ("name", Value::string("created")),
            ]),
        )]);
        insta::assert_snapshot!(dump(&value), @r"
        dimension_group: created {
          timeframes: [
            raw,
            time,
            date,
            week,
            month,
            year,
          ]
        }
        ");
    }

    #[test]
    fn test_list_threshold_option() {
        let value = obj([("fields", list(["a", "b"]))]);
        let mut builder = DocumentBuilder::with_options(BuildOptions {
            indent: "    ".to_string(),
            list_threshold: 1,
        });
        let document = builder.build(&value).unwrap();
        assert_eq!(document.to_string(), "fields: [\n    a,\n    b,\n]");
    }

    #[test]
    fn test_filters_list_is_quoted() {
        let value = obj([(
            "filters__all",
            Value::List(vec![Value::List(vec![
                obj([("status", Value::string("complete"))]),
                obj([("region", Value::string("-EMEA"))]),
            ])]),
        )]);
        insta::assert_snapshot!(dump(&value), @r#"
        filters: [
          status: "complete",
          region: "-EMEA",
        ]
        "#);
    }

    #[test]
    fn test_named_filters_become_filter_blocks() {
        let value = obj([(
            "filters",
            Value::List(vec![obj([
                ("name", Value::string("region")),
                ("type", Value::string("string")),
            ])]),
        )]);
        assert_eq!(dump(&value), "filter: region {\n  type: string\n}");
    }

    #[test]
    fn test_legacy_filters_blocks() {
        let value = obj([(
            "filters__all",
            Value::List(vec![obj([
                ("field", Value::string("status")),
                ("value", Value::string("complete")),
            ])]),
        )]);
        assert_eq!(
            dump(&value),
            "filters: {\n  field: status\n  value: \"complete\"\n}"
        );
    }

    #[test]
    fn test_name_field_keys_keep_name() {
        let value = obj([(
            "params",
            Value::List(vec![obj([
                ("name", Value::string("user")),
                ("value", Value::string("x")),
            ])]),
        )]);
        assert_eq!(dump(&value), "param: {\n  name: \"user\"\n  value: \"x\"\n}");
    }

    #[test]
    fn test_allowed_values_under_access_grant() {
        let value = obj([(
            "access_grants",
            Value::List(vec![obj([
                ("allowed_values", list(["a", "b"])),
                ("name", Value::string("can_view")),
            ])]),
        )]);
        assert_eq!(
            dump(&value),
            "access_grant: can_view {\n  allowed_values: [\"a\", \"b\"]\n}"
        );
    }

    #[test]
    fn test_blank_lines_between_blocks() {
        let value = obj([
            ("connection", Value::string("db")),
            (
                "explores",
                Value::List(vec![
                    obj([("name", Value::string("a"))]),
                    obj([("name", Value::string("b"))]),
                ]),
            ),
            ("label", Value::string("x")),
        ]);
        assert_eq!(
            dump(&value),
            "connection: \"db\"\n\nexplore: a {}\n\nexplore: b {}\n\nlabel: \"x\""
        );
    }

    #[test]
    fn test_top_level_pairs() {
        let value = obj([
            ("connection", Value::string("c53-looker")),
            ("includes", list(["*.view"])),
            ("fiscal_month_offset", Value::string("0")),
            ("week_start_day", Value::string("sunday")),
        ]);
        assert_eq!(
            dump(&value),
            "connection: \"c53-looker\"\ninclude: \"*.view\"\nfiscal_month_offset: 0\nweek_start_day: sunday"
        );
    }

    #[test]
    fn test_query_lists_stay_lists() {
        let value = obj([(
            "queries",
            Value::List(vec![obj([
                ("name", Value::string("query_one")),
                ("dimensions", list(["dimension_one", "dimension_two"])),
                ("measures", list(["measure_one"])),
            ])]),
        )]);
        insta::assert_snapshot!(dump(&value), @r"
        query: query_one {
          dimensions: [dimension_one, dimension_two]
          measures: [measure_one]
        }
        ");
    }

    #[test]
    fn test_anonymous_empty_block() {
        let value = obj([("link", obj([]))]);
        assert_eq!(dump(&value), "link: {}");
    }

    #[test]
    fn test_unsafe_literals_are_quoted() {
        let value = obj([
            ("type", Value::string("a b")),
            ("value_format_name", Value::string("")),
            ("hidden", Value::string("yes")),
        ]);
        assert_eq!(
            dump(&value),
            "type: \"a b\"\nvalue_format_name: \"\"\nhidden: yes"
        );
    }

    #[test]
    fn test_root_must_be_object() {
        let err = DocumentBuilder::new().build(&list(["a"])).unwrap_err();
        assert_eq!(err, BuildError::RootNotObject { kind: "list" });
    }

    #[test]
    fn test_nested_list_is_unsupported() {
        let value = obj([("fields", Value::List(vec![list(["a"])]))]);
        let err = DocumentBuilder::new().build(&value).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnsupportedValue {
                key: "fields".into(),
                kind: "list"
            }
        );
    }

    fn build_err(value: &Value) -> BuildError {
        DocumentBuilder::new().build(value).unwrap_err()
    }

    #[test]
    fn test_block_name_with_space_is_rejected() {
        let value = obj([("view", obj([("name", Value::string("my view"))]))]);
        assert_eq!(build_err(&value), unwritable("view", "my view"));
    }

    #[test]
    fn test_empty_block_name_is_rejected() {
        let value = obj([(
            "views",
            Value::List(vec![obj([("name", Value::string(""))])]),
        )]);
        assert_eq!(build_err(&value), unwritable("view", ""));
    }

    #[test]
    fn test_key_with_space_is_rejected() {
        let value = obj([("view", obj([("my label", Value::string("x"))]))]);
        assert_eq!(build_err(&value), unwritable("my label", "my label"));

        let value = obj([("my fields", list(["a"]))]);
        assert_eq!(build_err(&value), unwritable("my fields", "my fields"));
    }

    #[test]
    fn test_expression_with_terminator_is_rejected() {
        let value = obj([("sql", Value::string("a ;; b"))]);
        assert_eq!(build_err(&value), unwritable("sql", "a ;; b"));
    }

    #[test]
    fn test_empty_list() {
        let value = obj([("fields", Value::List(Vec::new()))]);
        assert_eq!(dump(&value), "fields: []");
    }
}
