//! Traversal over syntax trees.
//!
//! - [`Visitor`] has one method per node kind and produces a value; nodes
//!   dispatch to it through `accept`.
//! - [`Visit`] is a read-only walk whose default methods recurse into
//!   children. Override the methods you care about and call the matching
//!   `walk_*` function to keep descending.
//! - [`Fold`] consumes a tree and rebuilds it, re-checking container
//!   invariants on the way back up.

use crate::{Block, Container, Document, Item, List, ListItems, Pair, SyntaxToken, TreeError};

/// A visitor with one method per node kind.
pub trait Visitor {
    type Output;

    fn visit_document(&mut self, document: &Document) -> Self::Output;
    fn visit_container(&mut self, container: &Container) -> Self::Output;
    fn visit_block(&mut self, block: &Block) -> Self::Output;
    fn visit_list(&mut self, list: &List) -> Self::Output;
    fn visit_pair(&mut self, pair: &Pair) -> Self::Output;
    fn visit_token(&mut self, token: &SyntaxToken) -> Self::Output;
}

/// Read-only traversal that visits every node and token in document order.
pub trait Visit {
    fn visit_document(&mut self, document: &Document) {
        walk_document(self, document);
    }

    fn visit_container(&mut self, container: &Container) {
        walk_container(self, container);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_list(&mut self, list: &List) {
        walk_list(self, list);
    }

    fn visit_pair(&mut self, pair: &Pair) {
        walk_pair(self, pair);
    }

    fn visit_token(&mut self, _token: &SyntaxToken) {}
}

pub fn walk_document<V: Visit + ?Sized>(visitor: &mut V, document: &Document) {
    visitor.visit_container(&document.container);
}

pub fn walk_container<V: Visit + ?Sized>(visitor: &mut V, container: &Container) {
    for item in container {
        match item {
            Item::Block(block) => visitor.visit_block(block),
            Item::Pair(pair) => visitor.visit_pair(pair),
            Item::List(list) => visitor.visit_list(list),
        }
    }
}

pub fn walk_block<V: Visit + ?Sized>(visitor: &mut V, block: &Block) {
    visitor.visit_token(&block.kind);
    visitor.visit_token(&block.colon);
    if let Some(name) = &block.name {
        visitor.visit_token(name);
    }
    visitor.visit_token(&block.open);
    visitor.visit_container(&block.container);
    visitor.visit_token(&block.close);
}

pub fn walk_list<V: Visit + ?Sized>(visitor: &mut V, list: &List) {
    visitor.visit_token(&list.key);
    visitor.visit_token(&list.colon);
    visitor.visit_token(&list.open);
    if let Some(comma) = &list.leading_comma {
        visitor.visit_token(comma);
    }
    for index in 0..list.items.len() {
        if index > 0
            && let Some(comma) = list.separators.get(index - 1)
        {
            visitor.visit_token(comma);
        }
        match &list.items {
            ListItems::Values(values) => visitor.visit_token(&values[index]),
            ListItems::Pairs(pairs) => visitor.visit_pair(&pairs[index]),
        }
    }
    if let Some(comma) = &list.trailing_comma {
        visitor.visit_token(comma);
    }
    visitor.visit_token(&list.close);
}

pub fn walk_pair<V: Visit + ?Sized>(visitor: &mut V, pair: &Pair) {
    visitor.visit_token(&pair.key);
    visitor.visit_token(&pair.colon);
    visitor.visit_token(&pair.value);
}

/// Tree rewriting. The default methods rebuild the tree unchanged.
pub trait Fold {
    fn fold_document(&mut self, document: Document) -> Result<Document, TreeError> {
        fold_document(self, document)
    }

    fn fold_container(&mut self, container: Container) -> Result<Container, TreeError> {
        fold_container(self, container)
    }

    fn fold_block(&mut self, block: Block) -> Result<Block, TreeError> {
        fold_block(self, block)
    }

    fn fold_list(&mut self, list: List) -> List {
        fold_list(self, list)
    }

    fn fold_pair(&mut self, pair: Pair) -> Pair {
        fold_pair(self, pair)
    }

    fn fold_token(&mut self, token: SyntaxToken) -> SyntaxToken {
        token
    }
}

pub fn fold_document<F: Fold + ?Sized>(
    folder: &mut F,
    document: Document,
) -> Result<Document, TreeError> {
    Ok(Document {
        container: folder.fold_container(document.container)?,
        prefix: document.prefix,
        suffix: document.suffix,
    })
}

pub fn fold_container<F: Fold + ?Sized>(
    folder: &mut F,
    container: Container,
) -> Result<Container, TreeError> {
    let top_level = container.is_top_level();
    let items = container
        .into_items()
        .into_iter()
        .map(|item| {
            Ok(match item {
                Item::Block(block) => Item::Block(folder.fold_block(block)?),
                Item::Pair(pair) => Item::Pair(folder.fold_pair(pair)),
                Item::List(list) => Item::List(folder.fold_list(list)),
            })
        })
        .collect::<Result<Vec<_>, TreeError>>()?;
    Container::new(items, top_level)
}

pub fn fold_block<F: Fold + ?Sized>(folder: &mut F, block: Block) -> Result<Block, TreeError> {
    Ok(Block {
        kind: folder.fold_token(block.kind),
        colon: folder.fold_token(block.colon),
        name: block.name.map(|name| folder.fold_token(name)),
        open: folder.fold_token(block.open),
        container: folder.fold_container(block.container)?,
        close: folder.fold_token(block.close),
    })
}

pub fn fold_list<F: Fold + ?Sized>(folder: &mut F, list: List) -> List {
    let items = match list.items {
        ListItems::Values(values) => {
            ListItems::Values(values.into_iter().map(|v| folder.fold_token(v)).collect())
        }
        ListItems::Pairs(pairs) => {
            ListItems::Pairs(pairs.into_iter().map(|p| folder.fold_pair(p)).collect())
        }
    };
    List {
        key: folder.fold_token(list.key),
        colon: folder.fold_token(list.colon),
        open: folder.fold_token(list.open),
        leading_comma: list.leading_comma.map(|c| folder.fold_token(c)),
        items,
        separators: list
            .separators
            .into_iter()
            .map(|c| folder.fold_token(c))
            .collect(),
        trailing_comma: list.trailing_comma.map(|c| folder.fold_token(c)),
        close: folder.fold_token(list.close),
    }
}

pub fn fold_pair<F: Fold + ?Sized>(folder: &mut F, pair: Pair) -> Pair {
    Pair {
        key: folder.fold_token(pair.key),
        colon: folder.fold_token(pair.colon),
        value: folder.fold_token(pair.value),
    }
}
