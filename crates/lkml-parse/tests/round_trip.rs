use lkml_cst::{Item, ListItems};
use lkml_parse::{ParseError, parse};
use proptest::prelude::*;

const VIEW: &str = r#"# Orders view
include: "/views/*.view.lkml"

view: orders {
  sql_table_name: analytics.orders ;;
  label: "Orders \"All\""  # trailing comment

  dimension: id {
    primary_key: yes
    type: number
    sql: ${TABLE}.id ;;
  }

  dimension_group: created {
    type: time
    timeframes: [
      raw,
      date,
      week,
    ]
    sql: ${TABLE}.created_at ;;
  }

  measure: count {
    type: count
    drill_fields: [id, created_date]
    filters: [status: "complete", region: "-EMEA"]
    html:
      <b>{{ value }}</b>
    ;;
  }
}
"#;

#[test]
fn test_view_round_trip() {
    let document = parse(VIEW).unwrap();
    assert_eq!(document.to_string(), VIEW);
}

#[test]
fn test_view_structure() {
    let document = parse(VIEW).unwrap();
    let keys: Vec<_> = document.items().iter().map(Item::key).collect();
    assert_eq!(keys, ["include", "view"]);

    let Item::Block(view) = &document.items()[1] else {
        panic!("expected a view block");
    };
    let keys: Vec<_> = view.items().iter().map(Item::key).collect();
    assert_eq!(
        keys,
        ["sql_table_name", "label", "dimension", "dimension_group", "measure"]
    );

    let Item::Pair(label) = &view.items()[1] else {
        panic!("expected a label pair");
    };
    assert_eq!(label.value(), r#"Orders "All""#);

    let Item::Block(measure) = &view.items()[4] else {
        panic!("expected a measure block");
    };
    let Item::List(filters) = &measure.items()[2] else {
        panic!("expected a filters list");
    };
    let ListItems::Pairs(pairs) = &filters.items else {
        panic!("expected pair items");
    };
    assert_eq!(pairs[1].key(), "region");
    assert_eq!(pairs[1].value(), "-EMEA");

    let Item::Pair(html) = &measure.items()[3] else {
        panic!("expected an html pair");
    };
    assert_eq!(html.value(), "<b>{{ value }}</b>");
}

#[test]
fn test_expression_block_extraction() {
    let document = parse("sql_distinct_key: concat(${a.b}, '|', ${c.d}) ;;").unwrap();
    let Item::Pair(pair) = &document.items()[0] else {
        panic!("expected a pair");
    };
    assert_eq!(pair.key(), "sql_distinct_key");
    assert_eq!(pair.value(), "concat(${a.b}, '|', ${c.d})");
}

#[test]
fn test_windows_line_endings_round_trip() {
    let source = "view: a {\r\n  dimension: b {\r\n    type: string\r\n  }\r\n}\r\n";
    assert_eq!(parse(source).unwrap().to_string(), source);
}

#[test]
fn test_lex_errors_surface() {
    assert!(matches!(parse("label: \"open"), Err(ParseError::Lex(_))));
    assert!(matches!(parse("sql: select 1"), Err(ParseError::Lex(_))));
}

fn sep() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![" ", "\n", "\n  ", " # note\n", "\t", "\r\n", "\n\n    "])
}

fn colon_ws() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["", " ", "  ", "\n  "])
}

fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9_.]{1,8}",
        "[a-z #:{},\\[\\]]{0,8}".prop_map(|s| format!("\"{s}\"")),
        Just(r#""a \"quoted\" \\ word""#.to_string()),
        prop::collection::vec("[a-z_]{1,6}", 0..4).prop_map(|items| format!("[{}]", items.join(", "))),
        prop::collection::vec("[a-z_]{1,6}", 1..4)
            .prop_map(|items| format!("[\n  {},\n]", items.join(",\n  "))),
        Just(r#"[a: "1", b: "2"]"#.to_string()),
    ]
}

fn pairs() -> impl Strategy<Value = String> {
    let keys = prop::sample::select(vec![
        "label",
        "type",
        "hidden",
        "description",
        "fields",
        "value_format_name",
    ]);
    (
        prop::collection::btree_map(keys, (sep(), colon_ws(), value()), 0..4),
        prop::option::of((sep(), "[a-z ${}.,]{0,12}")),
    )
        .prop_map(|(pairs, sql)| {
            let mut out: String = pairs
                .into_iter()
                .map(|(key, (sep, ws, value))| format!("{sep}{key}:{ws}{value}"))
                .collect();
            if let Some((sep, body)) = sql {
                out.push_str(&format!("{sep}sql:{body};;"));
            }
            out
        })
}

fn container() -> impl Strategy<Value = String> {
    pairs().prop_recursive(3, 24, 3, |inner| {
        let block = (
            sep(),
            prop::sample::select(vec!["view", "dimension", "measure", "join"]),
            prop::option::of("[a-z_]{1,6}"),
            inner,
            sep(),
        )
            .prop_map(|(sep, kind, name, body, close)| {
                let name = name.map(|name| format!("{name} ")).unwrap_or_default();
                format!("{sep}{kind}: {name}{{{body}{close}}}")
            });
        (pairs(), prop::collection::vec(block, 0..3))
            .prop_map(|(pairs, blocks)| format!("{pairs}{}", blocks.concat()))
    })
}

proptest! {
    #[test]
    fn parse_is_lossless(body in container(), tail in prop::sample::select(vec!["", "\n", "\n# end\n"])) {
        let source = format!("{body}{tail}");
        let document = parse(&source).map_err(|e| TestCaseError::fail(format!("{e}\n{source}")))?;
        prop_assert_eq!(document.to_string(), source);
    }

    #[test]
    fn parse_never_panics(source in "[a-z :{}\\[\\],\"#;\n]{0,48}") {
        if let Ok(document) = parse(&source) {
            prop_assert_eq!(document.to_string(), source);
        }
    }
}
