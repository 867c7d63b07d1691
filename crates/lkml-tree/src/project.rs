//! Projection of a syntax tree into a plain [`Value`].

use std::fmt;

use lkml_cst::{Block, Container, Document, List, ListItems, Pair, SyntaxToken, Visitor};
use lkml_keys::{is_plural_key, pluralize};
use tracing::warn;

use crate::{Object, Value};

/// A key repeated where the projection cannot keep both values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    DuplicateKey {
        key: String,
        /// Line of the repeated key, if known.
        line: Option<u32>,
    },
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::DuplicateKey { key, line } => {
                write!(
                    f,
                    "key \"{key}\" already exists in tree and would overwrite the existing value"
                )?;
                if let Some(line) = line {
                    write!(f, " (line {line})")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ProjectionError {}

/// Turns a syntax tree into a plain [`Value`].
///
/// Blocks become objects with their name under `name`, lists become lists,
/// and pluralizable keys are gathered into a list under [`pluralize`]d keys.
/// A repeated key at the document root keeps the last value; anywhere else
/// it is an error.
pub struct ValueVisitor {
    /// Nesting of the container being visited; the root container is 0.
    depth: i32,
}

impl ValueVisitor {
    pub fn new() -> Self {
        Self { depth: -1 }
    }

    /// Merge a single-entry `update` into `target`.
    fn update(
        &self,
        target: &mut Object,
        update: Value,
        line: Option<u32>,
    ) -> Result<(), ProjectionError> {
        let Value::Object(update) = update else {
            return Ok(());
        };
        for entry in update.entries {
            if is_plural_key(&entry.key) {
                let plural = pluralize(&entry.key);
                match target.get_mut(&plural) {
                    Some(Value::List(values)) => values.push(entry.value),
                    Some(_) => {
                        return Err(ProjectionError::DuplicateKey { key: plural, line });
                    }
                    None => target.insert(plural, Value::List(vec![entry.value])),
                }
            } else if target.contains_key(&entry.key) {
                if self.depth == 0 {
                    warn!(
                        key = %entry.key,
                        "multiple declarations of top-level key found, using the last-declared value"
                    );
                    target.insert(entry.key, entry.value);
                } else {
                    return Err(ProjectionError::DuplicateKey {
                        key: entry.key,
                        line,
                    });
                }
            } else {
                target.insert(entry.key, entry.value);
            }
        }
        Ok(())
    }
}

impl Default for ValueVisitor {
    fn default() -> Self {
        Self::new()
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut object = Object::new();
    object.insert(key, value);
    Value::Object(object)
}

impl Visitor for ValueVisitor {
    type Output = Result<Value, ProjectionError>;

    fn visit_document(&mut self, document: &Document) -> Self::Output {
        document.container.accept(self)
    }

    fn visit_container(&mut self, container: &Container) -> Self::Output {
        let mut object = Object::new();
        if container.is_empty() {
            return Ok(Value::Object(object));
        }
        self.depth += 1;
        let result = container.iter().try_for_each(|item| {
            let update = item.accept(self)?;
            self.update(&mut object, update, item.line())
        });
        self.depth -= 1;
        result.map(|()| Value::Object(object))
    }

    fn visit_block(&mut self, block: &Block) -> Self::Output {
        let mut value = block.container.accept(self)?;
        if let (Some(name), Some(object)) = (&block.name, value.as_object_mut()) {
            object.insert("name", name.value.clone());
        }
        Ok(single(block.key(), value))
    }

    fn visit_list(&mut self, list: &List) -> Self::Output {
        let items = match &list.items {
            ListItems::Values(values) => values
                .iter()
                .map(|value| value.accept(self))
                .collect::<Result<Vec<_>, _>>()?,
            ListItems::Pairs(pairs) => pairs
                .iter()
                .map(|pair| pair.accept(self))
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(single(list.key(), Value::List(items)))
    }

    fn visit_pair(&mut self, pair: &Pair) -> Self::Output {
        Ok(single(pair.key(), pair.value.accept(self)?))
    }

    fn visit_token(&mut self, token: &SyntaxToken) -> Self::Output {
        Ok(Value::String(token.value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(source: &str) -> Result<Value, ProjectionError> {
        let document = lkml_parse::parse(source).unwrap();
        document.accept(&mut ValueVisitor::new())
    }

    #[test]
    fn test_pair() {
        let value = project("hidden: yes").unwrap();
        assert_eq!(value.get("hidden"), Some(&Value::string("yes")));
    }

    #[test]
    fn test_block_name_is_a_field() {
        let value = project("dimension: id {\n  type: number\n}").unwrap();
        let dimension = value.get("dimensions[0]").unwrap();
        assert_eq!(dimension.get("name").and_then(Value::as_str), Some("id"));
        assert_eq!(dimension.get("type").and_then(Value::as_str), Some("number"));
    }

    #[test]
    fn test_plural_keys_collect() {
        let source = "view: v {\n  dimension: a {}\n  dimension: b {}\n  measure: c {}\n}";
        let value = project(source).unwrap();
        let dimensions = value.get("views[0].dimensions").and_then(Value::as_list).unwrap();
        assert_eq!(dimensions.len(), 2);
        assert_eq!(dimensions[1].get("name").and_then(Value::as_str), Some("b"));
        assert_eq!(value.get("views[0].measures[0].name").and_then(Value::as_str), Some("c"));
    }

    #[test]
    fn test_list_of_values() {
        let value = project("fields: [a, \"b\"]").unwrap();
        assert_eq!(
            value.get("fields"),
            Some(&Value::List(vec![Value::string("a"), Value::string("b")]))
        );
    }

    #[test]
    fn test_list_of_pairs() {
        let value = project("explore: e {\n  filters: [a: \"1\", b: \"2\"]\n}").unwrap();
        let filters = value.get("explores[0].filters__all[0]").and_then(Value::as_list).unwrap();
        assert_eq!(filters[0].get("a").and_then(Value::as_str), Some("1"));
        assert_eq!(filters[1].get("b").and_then(Value::as_str), Some("2"));
    }

    #[test]
    fn test_expression_is_trimmed() {
        let value = project("dimension: d {\n  sql: ${TABLE}.id ;;\n}").unwrap();
        assert_eq!(
            value.get("dimensions[0].sql").and_then(Value::as_str),
            Some("${TABLE}.id")
        );
    }

    #[test]
    fn test_root_duplicate_last_wins() {
        let value = project("connection: \"a\"\nlabel: \"x\"\nconnection: \"b\"").unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object.entries[0].key, "connection");
        assert_eq!(object.get("connection"), Some(&Value::string("b")));
    }

    #[test]
    fn test_nested_plural_collision() {
        let err = project("view: v {\n  dimension: a {}\n  dimensions: [x]\n}").unwrap_err();
        assert_eq!(
            err,
            ProjectionError::DuplicateKey {
                key: "dimensions".into(),
                line: Some(3)
            }
        );
    }

    #[test]
    fn test_plural_joins_existing_list() {
        let value = project("view: v {\n  dimensions: [x]\n  dimension: a {}\n}").unwrap();
        let dimensions = value.get("views[0].dimensions").and_then(Value::as_list).unwrap();
        assert_eq!(dimensions[0], Value::string("x"));
        assert_eq!(dimensions[1].get("name").and_then(Value::as_str), Some("a"));
    }

    #[test]
    fn test_plural_onto_scalar_fails() {
        let err = project("view: v {\n  dimensions: x\n  dimension: a {}\n}").unwrap_err();
        assert!(matches!(err, ProjectionError::DuplicateKey { key, .. } if key == "dimensions"));
    }

    #[test]
    fn test_visitor_reusable_after_error() {
        let mut visitor = ValueVisitor::new();
        let failing = lkml_parse::parse("view: v {\n  dimensions: x\n  dimension: d {}\n}").unwrap();
        assert!(failing.accept(&mut visitor).is_err());

        let document = lkml_parse::parse("label: \"a\"\nlabel: \"b\"").unwrap();
        let value = document.accept(&mut visitor).unwrap();
        assert_eq!(value.get("label"), Some(&Value::string("b")));
    }

    #[test]
    fn test_repeated_plural_pairs_collect() {
        let value = project("explore: e {\n  extends: [a]\n  extends: [b]\n}").unwrap();
        assert_eq!(
            value.get("explores[0].extends__all"),
            Some(&Value::List(vec![
                Value::List(vec![Value::string("a")]),
                Value::List(vec![Value::string("b")]),
            ]))
        );
        assert!(value.get("explores[0].extends").is_none());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(project("").unwrap(), Value::object());
    }
}
