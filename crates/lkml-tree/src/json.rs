//! Conversion between plain values and JSON.

use serde_json::Map;

use crate::{BuildError, Object, Value};

impl Value {
    /// Convert to JSON. Object key order is kept.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(text) => serde_json::Value::String(text.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(object) => serde_json::Value::Object(
                object
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    /// Convert from JSON. Numbers, booleans and nulls have no LookML form.
    pub fn from_json(json: &serde_json::Value) -> Result<Value, BuildError> {
        from_json(json, "")
    }
}

fn from_json(json: &serde_json::Value, key: &str) -> Result<Value, BuildError> {
    let unsupported = |kind| BuildError::UnsupportedValue {
        key: key.to_string(),
        kind,
    };
    match json {
        serde_json::Value::String(text) => Ok(Value::String(text.clone())),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| from_json(item, key))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        serde_json::Value::Object(map) => {
            let mut object = Object::new();
            for (key, value) in map {
                object.insert(key.as_str(), from_json(value, key)?);
            }
            Ok(Value::Object(object))
        }
        serde_json::Value::Number(_) => Err(unsupported("number")),
        serde_json::Value::Bool(_) => Err(unsupported("boolean")),
        serde_json::Value::Null => Err(unsupported("null")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_json_keeps_order() {
        let value: Value = [("name", "b"), ("label", "a")]
            .into_iter()
            .collect::<Object>()
            .into();
        assert_eq!(value.to_json().to_string(), r#"{"name":"b","label":"a"}"#);
    }

    #[test]
    fn test_from_json() {
        let json = json!({"views": [{"name": "orders", "fields": ["a", "b"]}]});
        let value = Value::from_json(&json).unwrap();
        assert_eq!(value.get("views[0].fields[1]").and_then(Value::as_str), Some("b"));
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_from_json_rejects_scalars() {
        let err = Value::from_json(&json!({"view": {"hidden": true}})).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnsupportedValue {
                key: "hidden".into(),
                kind: "boolean"
            }
        );
        assert!(Value::from_json(&json!({"precision": 2})).is_err());
        assert!(Value::from_json(&json!({"label": null})).is_err());
    }
}
