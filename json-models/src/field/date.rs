//! Timestamps stored as integer milliseconds since the epoch.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use super::Field;
use crate::document::Document;
use crate::error::ModelError;
use crate::path::{FieldPath, Lookup};

/// Reads epoch milliseconds as a timezone-naive UTC timestamp.
#[derive(Debug, Clone)]
pub struct DateField {
    path: FieldPath,
    default: Option<NaiveDateTime>,
}

impl DateField {
    pub fn new(path: impl Into<FieldPath>) -> Self {
        Self {
            path: path.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: NaiveDateTime) -> Self {
        self.default = Some(default);
        self
    }
}

/// Epoch milliseconds to a naive UTC timestamp. Fractional milliseconds are dropped.
pub(crate) fn from_millis(value: &Value) -> Option<NaiveDateTime> {
    let millis = match value.as_i64() {
        Some(millis) => millis,
        None => value.as_f64().filter(|f| f.is_finite())? as i64,
    };
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

pub(crate) fn to_millis(value: &NaiveDateTime) -> Value {
    Value::from(value.and_utc().timestamp_millis())
}

impl Field for DateField {
    type Value = Option<NaiveDateTime>;

    fn path(&self) -> &FieldPath {
        &self.path
    }

    fn parse(&self, document: &Document) -> Result<Option<NaiveDateTime>, ModelError> {
        match document.lookup(&self.path)? {
            Lookup::Present(value) => from_millis(value)
                .map(Some)
                .ok_or_else(|| ModelError::field_type(&self.path, "epoch milliseconds", value)),
            _ => Ok(self.default),
        }
    }

    fn save(&self, value: Option<NaiveDateTime>) -> Value {
        value.as_ref().map(to_millis).unwrap_or(Value::Null)
    }
}
