//! Ordered collections of scalars or nested models.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use chrono::NaiveDateTime;
use serde_json::Value;

use super::scalar::Scalar;
use super::{date, Field};
use crate::document::Document;
use crate::error::ModelError;
use crate::model::Model;
use crate::path::{FieldPath, Lookup};

/// Something a [`Collection`] can hold: a scalar, a timestamp or a nested model.
pub trait Element: Sized + 'static {
    /// Builds one element from its array entry. `location` names the entry in errors.
    fn from_element(value: &Value, location: &str) -> Result<Self, ModelError>;

    fn to_element(&self) -> Value;

    /// Value of `attribute` used to order a collection of these elements.
    fn sort_key(&self, attribute: &str) -> Result<Value, ModelError>;
}

macro_rules! scalar_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                fn from_element(value: &Value, location: &str) -> Result<Self, ModelError> {
                    <$ty as Scalar>::from_json(value).ok_or_else(|| {
                        ModelError::field_type(location, <$ty as Scalar>::KIND, value)
                    })
                }

                fn to_element(&self) -> Value {
                    Scalar::to_json(self)
                }

                fn sort_key(&self, attribute: &str) -> Result<Value, ModelError> {
                    Err(ModelError::UnknownField {
                        model: <$ty as Scalar>::KIND,
                        field: attribute.to_string(),
                    })
                }
            }
        )*
    };
}

scalar_element!(String, i64, f64, bool);

impl Element for NaiveDateTime {
    fn from_element(value: &Value, location: &str) -> Result<Self, ModelError> {
        date::from_millis(value)
            .ok_or_else(|| ModelError::field_type(location, "epoch milliseconds", value))
    }

    fn to_element(&self) -> Value {
        date::to_millis(self)
    }

    fn sort_key(&self, attribute: &str) -> Result<Value, ModelError> {
        Err(ModelError::UnknownField {
            model: "timestamp",
            field: attribute.to_string(),
        })
    }
}

/// Nested models are rebuilt from their array entry, running their post-load validator.
impl<M: Model> Element for M {
    fn from_element(value: &Value, _location: &str) -> Result<Self, ModelError> {
        M::from_document(Document::from_value(value.clone())?)
    }

    fn to_element(&self) -> Value {
        self.document().to_value()
    }

    fn sort_key(&self, attribute: &str) -> Result<Value, ModelError> {
        M::model_type().field(attribute)?.sort_key(self.document())
    }
}

/// Array field. Every read builds a fresh `Vec`; nothing is cached between reads.
pub struct Collection<E> {
    path: FieldPath,
    order_by: Option<String>,
    _element: PhantomData<fn() -> E>,
}

impl<E: Element> Collection<E> {
    pub fn new(path: impl Into<FieldPath>) -> Self {
        Self {
            path: path.into(),
            order_by: None,
            _element: PhantomData,
        }
    }

    /// Sort elements ascending by this attribute of the element model. Equal keys keep
    /// document order.
    pub fn order_by(mut self, attribute: impl Into<String>) -> Self {
        self.order_by = Some(attribute.into());
        self
    }

    pub fn ordering(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    fn sort(&self, items: Vec<E>, attribute: &str) -> Result<Vec<E>, ModelError> {
        let mut keyed = items
            .into_iter()
            .map(|item| Ok((item.sort_key(attribute)?, item)))
            .collect::<Result<Vec<_>, ModelError>>()?;
        keyed.sort_by(|(a, _), (b, _)| compare_values(a, b));
        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }
}

impl<E> Clone for Collection<E> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            order_by: self.order_by.clone(),
            _element: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Collection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("path", &self.path)
            .field("order_by", &self.order_by)
            .finish()
    }
}

impl<E: Element> Field for Collection<E> {
    type Value = Vec<E>;

    fn path(&self) -> &FieldPath {
        &self.path
    }

    fn parse(&self, document: &Document) -> Result<Vec<E>, ModelError> {
        let items = match document.lookup(&self.path)? {
            Lookup::Present(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    E::from_element(item, &format!("{}[{}]", self.path, index))
                })
                .collect::<Result<Vec<_>, ModelError>>()?,
            Lookup::Present(other) => {
                return Err(ModelError::field_type(&self.path, "array", other));
            }
            _ => Vec::new(),
        };
        match &self.order_by {
            Some(attribute) => self.sort(items, attribute),
            None => Ok(items),
        }
    }

    fn save(&self, value: Vec<E>) -> Value {
        Value::Array(value.iter().map(Element::to_element).collect())
    }
}

/// Total order over JSON values: null < booleans < numbers < strings < arrays < objects.
///
/// Numbers compare numerically, strings by code point, arrays lexicographically. Objects of
/// equal size compare equal, which keeps them in place under a stable sort.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(x, y)| compare_values(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => rank(a).cmp(&rank(b)),
    }
}
