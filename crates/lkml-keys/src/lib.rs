//! Keyword tables for LookML.
//!
//! These tables drive three context-sensitive decisions:
//!
//! - the lexer switches to expression-block mode after an [`EXPR_BLOCK_KEYS`] key,
//! - sibling keys may only repeat when they are in [`PLURAL_KEYS`],
//! - the tree builder picks quoted literals for [`QUOTED_LITERAL_KEYS`].

/// Maximum number of characters the lexer inspects when looking for an
/// expression-block key followed by `:`.
pub const EXPR_BLOCK_LOOKAHEAD: usize = 25;

/// Keys whose value is a raw expression terminated by `;;`.
pub const EXPR_BLOCK_KEYS: &[&str] = &[
    "expression_custom_filter",
    "expression",
    "html",
    "sql_trigger_value",
    "sql_table_name",
    "sql_distinct_key",
    "sql_start",
    "sql_always_having",
    "sql_always_where",
    "sql_trigger",
    "sql_foreign_key",
    "sql_where",
    "sql_end",
    "sql_create",
    "sql_latitude",
    "sql_longitude",
    "sql_step",
    "sql_on",
    "sql_preamble",
    "sql",
];

/// Keys that may appear more than once within the same block.
pub const PLURAL_KEYS: &[&str] = &[
    "view",
    "measure",
    "dimension",
    "dimension_group",
    "filter",
    "access_filter",
    "bind_filters",
    "map_layer",
    "parameter",
    "set",
    "column",
    "derived_column",
    "include",
    "explore",
    "link",
    "when",
    "allowed_value",
    "named_value_format",
    "join",
    "datagroup",
    "access_grant",
    "sql_step",
    "action",
    "param",
    "form_param",
    "option",
    "user_attribute_param",
    "assert",
    "test",
    "query",
    "extends",
    "aggregate_table",
    "constant",
    "local_dependency",
    "remote_dependency",
    "extension",
    "application",
    "analysis_config",
    "filters",
];

/// Keys whose values are written as quoted literals when serialized.
pub const QUOTED_LITERAL_KEYS: &[&str] = &[
    "label",
    "view_label",
    "group_label",
    "group_item_label",
    "suggest_persist_for",
    "default_value",
    "direction",
    "value_format",
    "name",
    "url",
    "icon_url",
    "form_url",
    "default",
    "tags",
    "value",
    "description",
    "sortkeys",
    "indexes",
    "partition_keys",
    "connection",
    "include",
    "max_cache_age",
    "allowed_values",
    "timezone",
    "persist_for",
    "cluster_keys",
    "distribution",
    "extents_json_url",
    "feature_key",
    "file",
    "property_key",
    "property_label_key",
    "else",
];

/// Blocks where `name` is an ordinary field rather than the block name.
pub const KEYS_WITH_NAME_FIELDS: &[&str] = &["user_attribute_param", "param", "form_param", "option"];

/// Suffix used for plural keys that already end in `s`.
const ALL_SUFFIX: &str = "__all";

/// Whether `key` may repeat among its siblings.
pub fn is_plural_key(key: &str) -> bool {
    PLURAL_KEYS.contains(&key)
}

/// Whether `key` introduces an expression block.
pub fn is_expression_block_key(key: &str) -> bool {
    EXPR_BLOCK_KEYS.contains(&key)
}

/// Whether values of `key` are always quoted.
pub fn is_quoted_literal_key(key: &str) -> bool {
    QUOTED_LITERAL_KEYS.contains(&key)
}

/// Whether a block of type `key` keeps `name` as a regular field.
pub fn has_name_field(key: &str) -> bool {
    KEYS_WITH_NAME_FIELDS.contains(&key)
}

/// Returns the expression-block key that `text` starts with, if it is
/// immediately followed by a colon.
///
/// `text` is expected to be the lexer's bounded lookahead window.
pub fn expression_block_key(text: &str) -> Option<&'static str> {
    EXPR_BLOCK_KEYS
        .iter()
        .copied()
        .find(|key| text.strip_prefix(key).is_some_and(|rest| rest.starts_with(':')))
}

/// Converts a singular key like `explore` to its plural form `explores`.
pub fn pluralize(key: &str) -> String {
    match key {
        "filters" | "bind_filters" | "extends" => format!("{key}{ALL_SUFFIX}"),
        "query" => "queries".to_string(),
        _ => format!("{key}s"),
    }
}

/// Converts a plural key like `explores` back to `explore`.
pub fn singularize(key: &str) -> String {
    if let Some(stripped) = key.strip_suffix(ALL_SUFFIX) {
        return stripped.to_string();
    }
    match key {
        "queries" => "query".to_string(),
        _ => key.strip_suffix('s').unwrap_or(key).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("dimension"), "dimensions");
        assert_eq!(pluralize("query"), "queries");
        assert_eq!(pluralize("filters"), "filters__all");
        assert_eq!(pluralize("bind_filters"), "bind_filters__all");
        assert_eq!(pluralize("extends"), "extends__all");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("dimensions"), "dimension");
        assert_eq!(singularize("queries"), "query");
        assert_eq!(singularize("filters__all"), "filters");
        assert_eq!(singularize("extends__all"), "extends");
        assert_eq!(singularize("sql"), "sql");
    }

    #[test]
    fn test_plural_keys_survive_round_trip() {
        for key in PLURAL_KEYS {
            assert_eq!(&singularize(&pluralize(key)), key, "key {key}");
        }
    }

    #[test]
    fn test_expression_block_key() {
        assert_eq!(expression_block_key("sql: ${TABLE}.id ;;"), Some("sql"));
        assert_eq!(
            expression_block_key("sql_distinct_key: concat("),
            Some("sql_distinct_key")
        );
        assert_eq!(expression_block_key("sql_not_reserved_field: yes"), None);
        assert_eq!(expression_block_key("html_not_reserved: yes"), None);
        assert_eq!(expression_block_key("sql : x"), None);
    }
}
