//! Recursive-descent parser over a LookML token sequence.
//!
//! Grammar:
//!
//! ```text
//! document    := StreamStart? trivia container trivia StreamEnd
//! container   := ( block | pair | list )*
//! block       := key Literal? '{' container '}'
//! pair        := key value
//! key         := Literal ':'
//! list        := key '[' ','? list_values ']'
//! list_values := ( pair ( ',' pair )* | value ( ',' value )* ) ','?
//! value       := Literal | QuotedLiteral | ExpressionBlock ';;'
//! ```
//!
//! Every production returns `Ok(None)` when it does not match, and the
//! [`Parser::backtrack`] wrapper rewinds the cursor in that case. Hard errors
//! (`Err`) abort the whole parse.

use lkml_cst::{Block, Container, Document, Item, List, ListItems, Pair, SyntaxToken};
use lkml_tokenizer::{Token, TokenKind};
use tracing::{debug, trace};

use crate::{ParseError, SyntaxError};

/// Result of a grammar production: `Ok(None)` means "no match".
pub type Production<T> = Result<Option<T>, ParseError>;

/// The items of a list together with the commas between and after them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListValues {
    pub items: ListItems,
    pub separators: Vec<SyntaxToken>,
    pub trailing_comma: Option<SyntaxToken>,
}

enum ListEntry {
    Pair(Pair),
    Value(SyntaxToken),
}

/// Parses a token sequence into a [`Document`].
pub struct Parser {
    tokens: Vec<Token>,
    /// Cursor into `tokens`.
    index: usize,
    /// Farthest index reached by any attempt, used for error lines only.
    progress: usize,
    /// Nesting of active productions; the root container runs at depth 0.
    depth: i32,
}

impl Parser {
    /// Create a parser positioned at the first token.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            progress: 0,
            depth: -1,
        }
    }

    /// Current cursor position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Farthest cursor position reached so far.
    pub fn progress(&self) -> usize {
        self.progress
    }

    fn readable(&self) -> bool {
        self.index < self.tokens.len()
    }

    /// The token at the cursor.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Up to `n` tokens starting at the cursor.
    pub fn peek_n(&self, n: usize) -> &[Token] {
        let start = self.index.min(self.tokens.len());
        let end = (start + n).min(self.tokens.len());
        &self.tokens[start..end]
    }

    /// Move the cursor forward by `n` tokens.
    pub fn seek(&mut self, n: usize) {
        self.index = (self.index + n).min(self.tokens.len());
        self.progress = self
            .progress
            .max(self.index)
            .min(self.tokens.len().saturating_sub(1));
    }

    /// Consume the token at the cursor.
    pub fn read(&mut self) -> Option<Token> {
        let token = self.peek().cloned()?;
        self.seek(1);
        Some(token)
    }

    /// Consume up to `n` tokens.
    pub fn read_n(&mut self, n: usize) -> Vec<Token> {
        let tokens = self.peek_n(n).to_vec();
        self.seek(tokens.len());
        tokens
    }

    /// Test the kind of the next token without consuming anything.
    ///
    /// With `skip_trivia`, the first non-trivia token is tested instead.
    pub fn compare(&self, accept: impl Fn(&TokenKind) -> bool, skip_trivia: bool) -> bool {
        let token = if skip_trivia {
            self.next_significant()
        } else {
            self.peek()
        };
        token.is_some_and(|token| accept(&token.kind))
    }

    fn next_significant(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .skip(self.index)
            .find(|token| !token.kind.is_trivia())
    }

    /// Consume the token at the cursor and return its text value.
    pub fn read_value(&mut self) -> Result<String, ParseError> {
        let Some(token) = self.read() else {
            return Err(self.error("Unexpected end of stream"));
        };
        match token.value() {
            Some(value) => Ok(value.to_string()),
            None => Err(SyntaxError::new(
                format!("Token {token} does not have a consumable value"),
                token.line,
            )
            .into()),
        }
    }

    /// Consume consecutive trivia and return its source text.
    ///
    /// With `only_line_breaks`, horizontal whitespace stops the run, so only
    /// comments and line breaks are taken.
    pub fn read_trivia(&mut self, only_line_breaks: bool) -> String {
        let mut text = String::new();
        while let Some(token) = self.peek() {
            let take = if only_line_breaks {
                token.kind.is_line_trivia()
            } else {
                token.kind.is_trivia()
            };
            if !take {
                break;
            }
            text.push_str(&token.source_text());
            self.seek(1);
        }
        text
    }

    /// Consume the next token if it matches, returning its line.
    fn eat(&mut self, accept: impl Fn(&TokenKind) -> bool) -> Option<u32> {
        let line = self.peek().filter(|token| accept(&token.kind))?.line;
        self.seek(1);
        Some(line)
    }

    fn progress_token(&self) -> Option<&Token> {
        self.tokens.get(self.progress)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let line = self.progress_token().map_or(1, |token| token.line);
        SyntaxError::new(message, line).into()
    }

    /// Run `production`, rewinding the cursor if it does not match.
    pub fn backtrack<T>(
        &mut self,
        name: &'static str,
        production: impl FnOnce(&mut Self) -> Production<T>,
    ) -> Production<T> {
        let mark = self.index;
        self.depth += 1;
        let indent = self.depth.max(0) as usize * 2;
        trace!("{:indent$}{name} at token {mark}", "");

        let result = production(self);
        if matches!(result, Ok(None)) {
            trace!("{:indent$}{name} rewinds to token {mark}", "");
            self.index = mark;
        }

        self.depth -= 1;
        result
    }

    /// Parse the whole token sequence.
    pub fn parse(&mut self) -> Result<Document, ParseError> {
        debug!(tokens = self.tokens.len(), "parsing document");
        if self.compare(|kind| matches!(kind, TokenKind::StreamStart), false) {
            self.seek(1);
        }

        let prefix = self.read_trivia(false);
        let container = self.parse_container()?.unwrap_or_default();
        let suffix = self.read_trivia(false);

        if let Some(token) = self.peek()
            && token.kind != TokenKind::StreamEnd
        {
            return Err(SyntaxError::new(format!("Unexpected {}", describe(token)), token.line).into());
        }

        debug!(items = container.len(), "parsed document");
        Ok(Document {
            container,
            prefix,
            suffix,
        })
    }

    /// Blocks, pairs and lists up to the closing `}` or the end of the stream.
    pub fn parse_container(&mut self) -> Production<Container> {
        self.backtrack("container", |p| {
            let mut items = Vec::new();
            while p.readable() {
                if matches!(
                    p.next_significant().map(|token| &token.kind),
                    None | Some(TokenKind::StreamEnd | TokenKind::BlockEnd)
                ) {
                    break;
                }

                let item = if let Some(block) = p.parse_block()? {
                    Item::Block(block)
                } else if let Some(pair) = p.parse_pair()? {
                    Item::Pair(pair)
                } else if let Some(list) = p.parse_list()? {
                    Item::List(list)
                } else {
                    let found = p
                        .progress_token()
                        .map_or_else(|| "end of stream".to_string(), describe);
                    return Err(p.error(format!(
                        "Unable to find a matching expression for {found}"
                    )));
                };
                items.push(item);
            }

            let top_level = p.depth == 0;
            Ok(Some(Container::new(items, top_level)?))
        })
    }

    pub fn parse_block(&mut self) -> Production<Block> {
        self.backtrack("block", |p| {
            let Some((kind, colon)) = p.parse_key()? else {
                return Ok(None);
            };

            let name = match p.peek() {
                Some(Token {
                    kind: TokenKind::Literal(text),
                    line,
                }) => {
                    let name = SyntaxToken::literal(text.clone()).with_line(*line);
                    p.seek(1);
                    Some(name)
                }
                _ => None,
            };

            let open_prefix = p.read_trivia(false);
            let Some(open_line) = p.eat(|kind| matches!(kind, TokenKind::BlockStart)) else {
                return Ok(None);
            };
            let open = SyntaxToken::brace_open()
                .with_prefix(open_prefix)
                .with_suffix(p.read_trivia(true))
                .with_line(open_line);

            let Some(container) = p.parse_container()? else {
                return Ok(None);
            };

            let close_prefix = p.read_trivia(false);
            let Some(close_line) = p.eat(|kind| matches!(kind, TokenKind::BlockEnd)) else {
                return Ok(None);
            };
            let close = SyntaxToken::brace_close()
                .with_prefix(close_prefix)
                .with_suffix(p.read_trivia(true))
                .with_line(close_line);

            Ok(Some(Block {
                kind,
                colon,
                name,
                open,
                container,
                close,
            }))
        })
    }

    pub fn parse_pair(&mut self) -> Production<Pair> {
        self.backtrack("pair", |p| {
            let Some((key, colon)) = p.parse_key()? else {
                return Ok(None);
            };
            let Some(value) = p.parse_value()? else {
                return Ok(None);
            };
            Ok(Some(Pair { key, colon, value }))
        })
    }

    /// A literal key and the colon after it.
    pub fn parse_key(&mut self) -> Production<(SyntaxToken, SyntaxToken)> {
        self.backtrack("key", |p| {
            let prefix = p.read_trivia(false);
            let Some(line) = p.peek().map(|token| token.line) else {
                return Ok(None);
            };
            if !p.compare(|kind| matches!(kind, TokenKind::Literal(_)), false) {
                return Ok(None);
            }
            let key = SyntaxToken::literal(p.read_value()?)
                .with_prefix(prefix)
                .with_line(line);

            let colon_prefix = p.read_trivia(false);
            let Some(colon_line) = p.eat(|kind| matches!(kind, TokenKind::Colon)) else {
                return Ok(None);
            };
            let colon = SyntaxToken::colon()
                .with_prefix(colon_prefix)
                .with_suffix(p.read_trivia(false))
                .with_line(colon_line);

            Ok(Some((key, colon)))
        })
    }

    /// A literal, quoted literal, or expression block.
    pub fn parse_value(&mut self) -> Production<SyntaxToken> {
        self.backtrack("value", |p| {
            let prefix = p.read_trivia(false);
            let Some(token) = p.peek().cloned() else {
                return Ok(None);
            };

            let value = match token.kind {
                TokenKind::Literal(text) => {
                    p.seek(1);
                    SyntaxToken::literal(text).with_suffix(p.read_trivia(false))
                }
                TokenKind::QuotedLiteral { raw, unescaped } => {
                    p.seek(1);
                    SyntaxToken::quoted_raw(unescaped, raw).with_suffix(p.read_trivia(true))
                }
                TokenKind::ExpressionBlock(text) => {
                    p.seek(1);
                    if p
                        .eat(|kind| matches!(kind, TokenKind::ExpressionBlockEnd))
                        .is_none()
                    {
                        return Err(p.error("Expected an expression block end"));
                    }
                    SyntaxToken::expression_from_source(&text).with_suffix(p.read_trivia(true))
                }
                _ => return Ok(None),
            };

            Ok(Some(value.with_prefix(prefix).with_line(token.line)))
        })
    }

    pub fn parse_list(&mut self) -> Production<List> {
        self.backtrack("list", |p| {
            let Some((key, colon)) = p.parse_key()? else {
                return Ok(None);
            };

            let open_prefix = p.read_trivia(false);
            let Some(open_line) = p.eat(|kind| matches!(kind, TokenKind::ListStart)) else {
                return Ok(None);
            };
            let open = SyntaxToken::bracket_open()
                .with_prefix(open_prefix)
                .with_line(open_line);

            let leading_comma = p.parse_comma()?;
            let Some(values) = p.parse_list_values()? else {
                return Ok(None);
            };

            let close_prefix = p.read_trivia(false);
            let Some(close_line) = p.eat(|kind| matches!(kind, TokenKind::ListEnd)) else {
                return Ok(None);
            };
            let close = SyntaxToken::bracket_close()
                .with_prefix(close_prefix)
                .with_suffix(p.read_trivia(true))
                .with_line(close_line);

            Ok(Some(List {
                key,
                colon,
                open,
                leading_comma,
                items: values.items,
                separators: values.separators,
                trailing_comma: values.trailing_comma,
                close,
            }))
        })
    }

    /// Comma-separated list items up to, not including, the closing `]`.
    ///
    /// All items must be pairs or all must be plain values, and expression
    /// blocks are rejected.
    pub fn parse_list_values(&mut self) -> Production<ListValues> {
        let mut items: Option<ListItems> = None;
        let mut separators = Vec::new();
        let mut trailing_comma = None;

        loop {
            match self.next_significant().map(|token| &token.kind) {
                Some(TokenKind::ListEnd) => break,
                None | Some(TokenKind::StreamEnd) => {
                    return Err(self.error("Unexpected end of stream"));
                }
                _ => {}
            }

            if items.as_ref().is_some_and(|items| !items.is_empty()) {
                let Some(comma) = self.parse_comma()? else {
                    return Err(self.error("Expected a comma between list values"));
                };
                if self.compare(|kind| matches!(kind, TokenKind::ListEnd), true) {
                    trailing_comma = Some(comma);
                    break;
                }
                separators.push(comma);
                if matches!(
                    self.next_significant().map(|token| &token.kind),
                    None | Some(TokenKind::StreamEnd)
                ) {
                    return Err(self.error("Unexpected end of stream"));
                }
            }

            let entry = if let Some(pair) = self.parse_pair()? {
                ListEntry::Pair(pair)
            } else if let Some(value) = self.parse_value()? {
                ListEntry::Value(value)
            } else {
                return Err(self.error("Expected a value or key-value pair"));
            };

            let value = match &entry {
                ListEntry::Pair(pair) => &pair.value,
                ListEntry::Value(value) => value,
            };
            if value.is_expression() {
                let line = match value.line {
                    Some(line) => line,
                    None => self.progress_token().map_or(1, |token| token.line),
                };
                return Err(
                    SyntaxError::new("Cannot use an expression block in a list", line).into(),
                );
            }

            let is_pair = matches!(entry, ListEntry::Pair(_));
            let list = items.get_or_insert_with(|| {
                if is_pair {
                    ListItems::Pairs(Vec::new())
                } else {
                    ListItems::Values(Vec::new())
                }
            });
            match (list, entry) {
                (ListItems::Pairs(pairs), ListEntry::Pair(pair)) => pairs.push(pair),
                (ListItems::Values(values), ListEntry::Value(value)) => values.push(value),
                (ListItems::Pairs(_), ListEntry::Value(_)) => {
                    return Err(self.error("Expected all list items to be key-value pairs"));
                }
                (ListItems::Values(_), ListEntry::Pair(_)) => {
                    return Err(self.error("Expected all list items to be values"));
                }
            }
        }

        Ok(Some(ListValues {
            items: items.unwrap_or_default(),
            separators,
            trailing_comma,
        }))
    }

    pub fn parse_comma(&mut self) -> Production<SyntaxToken> {
        self.backtrack("comma", |p| {
            let prefix = p.read_trivia(false);
            let Some(line) = p.eat(|kind| matches!(kind, TokenKind::Comma)) else {
                return Ok(None);
            };
            Ok(Some(
                SyntaxToken::comma()
                    .with_prefix(prefix)
                    .with_suffix(p.read_trivia(false))
                    .with_line(line),
            ))
        })
    }
}

/// How a token is named in error messages.
fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::StreamEnd => "end of stream".to_string(),
        _ => format!("'{}'", token.source_text().trim()),
    }
}
