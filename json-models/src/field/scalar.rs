//! Text, integer, float and boolean fields.

use serde_json::Value;

use super::Field;
use crate::document::Document;
use crate::error::ModelError;
use crate::path::{FieldPath, Lookup};

/// A leaf type a [`ScalarField`] can hold. Conversion is strict: no coercion between kinds.
pub trait Scalar: Clone + Send + Sync + 'static {
    /// Human-readable kind used in [`ModelError::FieldType`].
    const KIND: &'static str;

    fn from_json(value: &Value) -> Option<Self>;

    fn to_json(&self) -> Value;
}

impl Scalar for String {
    const KIND: &'static str = "string";

    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Scalar for i64 {
    const KIND: &'static str = "integer";

    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl Scalar for f64 {
    const KIND: &'static str = "number";

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn to_json(&self) -> Value {
        // NaN and infinities have no JSON form
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl Scalar for bool {
    const KIND: &'static str = "boolean";

    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

/// Scalar field with an optional default.
#[derive(Debug, Clone)]
pub struct ScalarField<T> {
    path: FieldPath,
    default: Option<T>,
}

pub type CharField = ScalarField<String>;
pub type IntField = ScalarField<i64>;
pub type FloatField = ScalarField<f64>;
pub type BoolField = ScalarField<bool>;

impl<T: Scalar> ScalarField<T> {
    pub fn new(path: impl Into<FieldPath>) -> Self {
        Self {
            path: path.into(),
            default: None,
        }
    }

    /// Value returned when the leaf is missing, null or `{}`.
    pub fn with_default(mut self, default: impl Into<T>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }
}

impl<T: Scalar> Field for ScalarField<T> {
    type Value = Option<T>;

    fn path(&self) -> &FieldPath {
        &self.path
    }

    fn parse(&self, document: &Document) -> Result<Option<T>, ModelError> {
        match document.lookup(&self.path)? {
            Lookup::Present(value) => T::from_json(value)
                .map(Some)
                .ok_or_else(|| ModelError::field_type(&self.path, T::KIND, value)),
            _ => Ok(self.default.clone()),
        }
    }

    fn save(&self, value: Option<T>) -> Value {
        value.map(|v| v.to_json()).unwrap_or(Value::Null)
    }
}
