//! Plain value types for LookML documents.
//!
//! Every leaf is a string. Blocks become objects, lists become lists, and
//! repeated keys are gathered into lists under their plural name.

/// A plain LookML value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Scalar text, quoted or not in the source.
    String(String),
    /// A list, or the repeated values of a pluralizable key.
    List(Vec<Value>),
    /// A block or a document.
    Object(Object),
}

/// An ordered mapping of keys to values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Object {
    /// Entries in insertion order.
    pub entries: Vec<Entry>,
}

/// An entry in an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
}

impl Value {
    /// Create a string value.
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    /// Create an empty object.
    pub fn object() -> Self {
        Value::Object(Object::default())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// Get a value by path.
    ///
    /// Path segments are separated by `.`.
    /// Use `[n]` for list indexing: `views[0].dimensions[1].name`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }

        let (segment, rest) = split_path(path);
        let value = match self {
            Value::Object(object) => object.get(segment)?,
            Value::List(items) => {
                let index: usize = segment.strip_prefix('[')?.strip_suffix(']')?.parse().ok()?;
                items.get(index)?
            }
            Value::String(_) => return None,
        };
        value.get(rest)
    }
}

/// Split off the first path segment. `a.b` → (`a`, `b`), `a[0].b` → (`a`, `[0].b`).
fn split_path(path: &str) -> (&str, &str) {
    if path.starts_with('[') {
        return match path.find(']') {
            Some(end) => {
                let rest = &path[end + 1..];
                (&path[..=end], rest.strip_prefix('.').unwrap_or(rest))
            }
            None => (path, ""),
        };
    }
    match path.find(['.', '[']) {
        Some(i) if path.as_bytes()[i] == b'.' => (&path[..i], &path[i + 1..]),
        Some(i) => (&path[..i], &path[i..]),
        None => (path, ""),
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get entry value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    /// Get mutable entry value by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|e| e.key == key)
            .map(|e| &mut e.value)
    }

    /// Iterate over entries as (key, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|e| (e.key.as_str(), &e.value))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or update an entry. An existing entry keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(existing) => *existing = value,
            None => self.entries.push(Entry { key, value }),
        }
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|e| e.key == key)?;
        Some(self.entries.remove(index).value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = Object::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let dimension: Object = [("name", "id"), ("type", "number")].into_iter().collect();
        let mut view = Object::new();
        view.insert("name", "orders");
        view.insert("dimensions", vec![Value::Object(dimension)]);
        let mut root = Object::new();
        root.insert("views", vec![Value::Object(view)]);
        Value::Object(root)
    }

    #[test]
    fn test_get_path() {
        let value = sample();
        assert_eq!(
            value.get("views[0].dimensions[0].type").and_then(Value::as_str),
            Some("number")
        );
        assert_eq!(value.get("views[0].name").and_then(Value::as_str), Some("orders"));
        assert!(value.get("views[1]").is_none());
        assert!(value.get("views.name").is_none());
        assert_eq!(value.get(""), Some(&value));
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("a.b"), ("a", "b"));
        assert_eq!(split_path("a[0].b"), ("a", "[0].b"));
        assert_eq!(split_path("[0].b"), ("[0]", "b"));
        assert_eq!(split_path("[0][1]"), ("[0]", "[1]"));
        assert_eq!(split_path("a"), ("a", ""));
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut object = Object::new();
        object.insert("a", "1");
        object.insert("b", "2");
        object.insert("a", "3");
        let keys: Vec<_> = object.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(object.get("a"), Some(&Value::string("3")));
    }

    #[test]
    fn test_remove() {
        let mut object: Object = [("name", "x"), ("label", "y")].into_iter().collect();
        assert_eq!(object.remove("name"), Some(Value::string("x")));
        assert_eq!(object.remove("name"), None);
        assert_eq!(object.len(), 1);
    }
}
