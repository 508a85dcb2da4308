//! The document tree backing one model instance.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::path::{self, FieldPath, Lookup};

/// A parsed JSON object. Keys keep document order, so serializing reproduces the input layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    root: Map<String, Value>,
}

impl Document {
    /// Empty tree (`{}`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a serialized document. An empty or blank string is an empty document.
    pub fn parse(json: &str) -> Result<Self, ModelError> {
        if json.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Wraps an already-decoded value without re-parsing. The root must be an object.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            Value::Null => Ok(Self::new()),
            other => Err(ModelError::MalformedDocument(format!(
                "document root must be an object, found {}",
                root_kind(&other)
            ))),
        }
    }

    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn lookup(&self, path: &FieldPath) -> Result<Lookup<'_>, ModelError> {
        path::resolve(&self.root, path)
    }

    pub fn assign(&mut self, path: &FieldPath, value: Value) -> Result<(), ModelError> {
        path::assign(&mut self.root, path, value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Canonical compact form: no whitespace around separators, keys in tree order.
    pub fn to_compact_string(&self) -> String {
        Value::Object(self.root.clone()).to_string()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact_string())
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}

fn root_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_blank_is_empty() {
        assert!(Document::parse("").unwrap().is_empty());
        assert!(Document::parse("  \n").unwrap().is_empty());
    }

    #[test]
    fn parse_invalid_json_is_a_validation_failure() {
        let err = Document::parse("<HTML><body>Nothing to see here</body></HTML>").unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid JSON");
    }

    #[test]
    fn non_object_root_is_malformed() {
        let err = Document::parse("[1, 2]").unwrap_err();
        assert!(matches!(err, ModelError::MalformedDocument(_)));
        assert!(Document::from_value(json!("text")).is_err());
    }

    /// **Scenario**: stringifying keeps key order and drops whitespace.
    #[test]
    fn compact_string_keeps_key_order() {
        let doc = Document::parse(r#"{ "b" : 1, "a" : { "z": [1, 2], "y": null } }"#).unwrap();
        assert_eq!(doc.to_compact_string(), r#"{"b":1,"a":{"z":[1,2],"y":null}}"#);
        assert_eq!(doc.to_string(), doc.to_compact_string());
    }

    #[test]
    fn lookup_and_assign_go_through_paths() {
        let mut doc = Document::new();
        let path = FieldPath::new("kiddie.value");
        assert_eq!(doc.lookup(&path).unwrap(), Lookup::Missing);
        doc.assign(&path, json!("Kermit")).unwrap();
        assert_eq!(doc.lookup(&path).unwrap(), Lookup::Present(&json!("Kermit")));
        assert_eq!(doc.into_value(), json!({"kiddie": {"value": "Kermit"}}));
    }

    #[test]
    fn serde_goes_through_the_root_object() {
        let doc: Document = serde_json::from_str(r#"{"field1":"hello"}"#).unwrap();
        assert_eq!(doc.to_value(), json!({"field1": "hello"}));
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"field1":"hello"}"#);
        assert!(serde_json::from_str::<Document>("[1]").is_err());
    }
}
