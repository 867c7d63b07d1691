//! Tree nodes.
//!
//! Every node writes out its exact source text through [`fmt::Display`].

use std::collections::HashMap;
use std::fmt;

use lkml_keys::is_plural_key;

use crate::{SyntaxToken, TreeError, Visitor};

/// A key-value pair: `hidden: yes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: SyntaxToken,
    pub colon: SyntaxToken,
    pub value: SyntaxToken,
}

impl Pair {
    /// Create a pair with a default colon.
    pub fn new(key: SyntaxToken, value: SyntaxToken) -> Self {
        Self {
            key,
            colon: SyntaxToken::colon(),
            value,
        }
    }

    /// The key text.
    pub fn key(&self) -> &str {
        &self.key.value
    }

    /// The value text.
    pub fn value(&self) -> &str {
        &self.value.value
    }

    pub fn line(&self) -> Option<u32> {
        self.key.line
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_pair(self)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key, self.colon, self.value)
    }
}

/// The items of a list. A list holds either plain values or pairs, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItems {
    Values(Vec<SyntaxToken>),
    Pairs(Vec<Pair>),
}

impl ListItems {
    pub fn len(&self) -> usize {
        match self {
            ListItems::Values(values) => values.len(),
            ListItems::Pairs(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_item(&self, index: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListItems::Values(values) => write!(f, "{}", values[index]),
            ListItems::Pairs(pairs) => write!(f, "{}", pairs[index]),
        }
    }
}

impl Default for ListItems {
    fn default() -> Self {
        ListItems::Values(Vec::new())
    }
}

/// A bracketed list: `fields: [a, b]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub key: SyntaxToken,
    pub colon: SyntaxToken,
    pub open: SyntaxToken,
    /// Comma directly after `[`.
    pub leading_comma: Option<SyntaxToken>,
    pub items: ListItems,
    /// Commas between items; always one fewer than the items.
    pub separators: Vec<SyntaxToken>,
    /// Comma directly before `]`.
    pub trailing_comma: Option<SyntaxToken>,
    pub close: SyntaxToken,
}

impl List {
    /// Create a single-line list, items separated by `", "`.
    pub fn new(key: SyntaxToken, items: ListItems) -> Self {
        let separators = (1..items.len())
            .map(|_| SyntaxToken::comma().with_suffix(" "))
            .collect();
        Self {
            key,
            colon: SyntaxToken::colon(),
            open: SyntaxToken::bracket_open(),
            leading_comma: None,
            items,
            separators,
            trailing_comma: None,
            close: SyntaxToken::bracket_close(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key.value
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line(&self) -> Option<u32> {
        self.key.line
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_list(self)
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key, self.colon, self.open)?;
        if let Some(comma) = &self.leading_comma {
            write!(f, "{comma}")?;
        }
        for index in 0..self.items.len() {
            if index > 0 {
                match self.separators.get(index - 1) {
                    Some(comma) => write!(f, "{comma}")?,
                    None => f.write_str(", ")?,
                }
            }
            self.items.write_item(index, f)?;
        }
        if let Some(comma) = &self.trailing_comma {
            write!(f, "{comma}")?;
        }
        write!(f, "{}", self.close)
    }
}

/// A braced block: `dimension: id { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The block type, e.g. `dimension`.
    pub kind: SyntaxToken,
    pub colon: SyntaxToken,
    /// The block name. Anonymous blocks such as `link: { ... }` have none.
    pub name: Option<SyntaxToken>,
    pub open: SyntaxToken,
    pub container: Container,
    pub close: SyntaxToken,
}

impl Block {
    /// Create a block with default punctuation.
    pub fn new(kind: SyntaxToken, name: Option<SyntaxToken>, container: Container) -> Self {
        Self {
            kind,
            colon: SyntaxToken::colon(),
            name,
            open: SyntaxToken::brace_open(),
            container,
            close: SyntaxToken::brace_close(),
        }
    }

    /// The block type text.
    pub fn key(&self) -> &str {
        &self.kind.value
    }

    /// The block name text, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(|name| name.value.as_str())
    }

    pub fn items(&self) -> &[Item] {
        &self.container.items
    }

    pub fn line(&self) -> Option<u32> {
        self.kind.line
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_block(self)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.colon)?;
        if let Some(name) = &self.name {
            write!(f, "{name}")?;
        }
        write!(f, "{}{}{}", self.open, self.container, self.close)
    }
}

/// A member of a [`Container`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Block(Block),
    Pair(Pair),
    List(List),
}

impl Item {
    /// The key that introduces this item.
    pub fn key(&self) -> &str {
        match self {
            Item::Block(block) => block.key(),
            Item::Pair(pair) => pair.key(),
            Item::List(list) => list.key(),
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Item::Block(block) => block.line(),
            Item::Pair(pair) => pair.line(),
            Item::List(list) => list.line(),
        }
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Item::Block(block) => block.accept(visitor),
            Item::Pair(pair) => pair.accept(visitor),
            Item::List(list) => list.accept(visitor),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Block(block) => block.fmt(f),
            Item::Pair(pair) => pair.fmt(f),
            Item::List(list) => list.fmt(f),
        }
    }
}

impl From<Block> for Item {
    fn from(block: Block) -> Self {
        Item::Block(block)
    }
}

impl From<Pair> for Item {
    fn from(pair: Pair) -> Self {
        Item::Pair(pair)
    }
}

impl From<List> for Item {
    fn from(list: List) -> Self {
        Item::List(list)
    }
}

/// An ordered sequence of blocks, pairs and lists.
///
/// Below the document root, a key may only repeat among siblings when it is
/// pluralizable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Container {
    items: Vec<Item>,
    top_level: bool,
}

impl Container {
    /// Create a container, checking for repeated keys unless `top_level`.
    pub fn new(items: Vec<Item>, top_level: bool) -> Result<Self, TreeError> {
        if !top_level {
            let mut seen: HashMap<&str, usize> = HashMap::new();
            for item in &items {
                let count = seen.entry(item.key()).or_default();
                *count += 1;
                if *count > 1 && !is_plural_key(item.key()) {
                    return Err(TreeError::DuplicateKey {
                        key: item.key().to_string(),
                        line: item.line(),
                    });
                }
            }
        }
        Ok(Self { items, top_level })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether this is the document's root container.
    pub fn is_top_level(&self) -> bool {
        self.top_level
    }

    pub fn line(&self) -> Option<u32> {
        self.items.first().and_then(Item::line)
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_container(self)
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// The root of a parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub container: Container,
    /// Trivia before the first item.
    pub prefix: String,
    /// Trivia after the last item.
    pub suffix: String,
}

impl Document {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        self.container.items()
    }

    /// Documents always start on the first line.
    pub fn line(&self) -> Option<u32> {
        Some(1)
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_document(self)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.container, self.suffix)
    }
}
