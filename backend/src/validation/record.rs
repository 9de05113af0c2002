use serde::{Deserialize, Serialize};
use serde_json::Value;

/// FormRecord
///
/// An immutable snapshot of a form's state, addressed by dot-delimited field paths
/// (`equipment.mewp`, `contacts.0.phone`). The validator only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord(Value);

impl Default for FormRecord {
    fn default() -> Self {
        Self(Value::Object(Default::default()))
    }
}

impl From<Value> for FormRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl FormRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Walks the path one segment at a time. Numeric segments index into arrays.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.0, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// A field is filled when it holds a value: not missing, not null, not a blank
    /// string, not an empty list. `false` and `0` count as filled.
    pub fn is_filled(&self, path: &str) -> bool {
        match self.get(path) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    /// Checkbox-style truthiness: `true`, non-blank strings, non-zero numbers and
    /// non-empty collections.
    pub fn is_truthy(&self, path: &str) -> bool {
        match self.get(path) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
        }
    }
}
