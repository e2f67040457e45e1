//! Synthetic record type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One generated domain record: a mapping of field name to value.
///
/// Records carry no identity beyond their fields. The publish key is read from
/// a field named by the generator that produced the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyntheticRecord {
    fields: Map<String, Value>,
}

impl SyntheticRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Get a field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Render a field as a publish key.
    ///
    /// Strings are used verbatim and numbers/booleans are formatted. Missing,
    /// null and nested values yield `None`.
    pub fn key(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for SyntheticRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> SyntheticRecord {
        match value {
            Value::Object(map) => SyntheticRecord::new(map),
            other => panic!("Expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_key_from_string_and_number() {
        let rec = record(json!({"id": "abc", "user_id": 4200, "flag": true}));

        assert_eq!(rec.key("id").as_deref(), Some("abc"));
        assert_eq!(rec.key("user_id").as_deref(), Some("4200"));
        assert_eq!(rec.key("flag").as_deref(), Some("true"));
    }

    #[test]
    fn test_key_missing_or_nested() {
        let rec = record(json!({"nested": {"a": 1}, "nothing": null}));

        assert!(rec.key("nested").is_none());
        assert!(rec.key("nothing").is_none());
        assert!(rec.key("absent").is_none());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let rec = record(json!({"currency": "USD"}));
        let text = serde_json::to_string(&rec).unwrap();
        assert_eq!(text, r#"{"currency":"USD"}"#);
    }
}
