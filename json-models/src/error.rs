//! Errors surfaced by models, fields and queries.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

/// Errors raised while loading documents, reading fields or running queries.
///
/// Cloneable so that stubbed failures can be replayed for every matching call.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The decoded input has a non-object root, or a path walked through a value that
    /// is not an object.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Rejected at load: input that is not JSON, or a model's post-load validator.
    #[error("{0}")]
    Validation(String),

    /// A typed field found a leaf it cannot represent (e.g. text in an integer field).
    #[error("field `{path}` expected {expected}, found {found}")]
    FieldType {
        path: String,
        expected: &'static str,
        found: String,
    },

    /// No finder is registered for exactly the supplied set of query fields.
    #[error("no finder registered on {model} for fields [{}]", .fields.join(", "))]
    NoRegisteredFinder {
        model: &'static str,
        fields: Vec<String>,
    },

    /// A single-result query got an empty or non-2xx response.
    #[error("DoesNotExist: no {model} found at {url}")]
    DoesNotExist { model: &'static str, url: String },

    /// A query ran under an active stub that has no matching expectation.
    #[error("unexpected call on stubbed {model}: {call}")]
    UnexpectedCall { model: &'static str, call: String },

    /// A field name that the model type does not declare.
    #[error("{model} has no field named `{field}`")]
    UnknownField { model: &'static str, field: String },

    /// A multi-result query got a non-2xx response with a body.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    /// The transport failed before producing a response (connect error, timeout, ...).
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Any other error, typically raised by a stub expectation.
    #[error(transparent)]
    Custom(Arc<dyn StdError + Send + Sync>),
}

/// A model type declaration that cannot be used. Raised once, when the type is first touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("field `{field}` has an unusable path `{path}`")]
    MalformedPath { field: String, path: String },

    #[error("finder with template `{template}` has no keys")]
    EmptyFinder { template: String },

    #[error("finder [{}] names `{key}` more than once", .keys.join(", "))]
    DuplicateFinderKey { keys: Vec<String>, key: String },

    #[error("finder key set [{}] is registered more than once", .keys.join(", "))]
    DuplicateFinder { keys: Vec<String> },

    #[error(
        "finder [{}] has {} keys but template `{template}` has {placeholders} placeholders",
        .keys.join(", "),
        .keys.len()
    )]
    PlaceholderCount {
        keys: Vec<String>,
        template: String,
        placeholders: usize,
    },
}

impl ModelError {
    /// Wraps an arbitrary error so it can travel through model APIs.
    pub fn custom<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ModelError::Custom(Arc::new(error))
    }

    /// Returns the wrapped custom error if it is an `E`.
    pub fn downcast_custom<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            ModelError::Custom(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub(crate) fn field_type(
        path: impl fmt::Display,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        ModelError::FieldType {
            path: path.to_string(),
            expected,
            found: describe(found),
        }
    }
}

fn describe(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        debug!(error = %e, "rejected input that is not JSON");
        ModelError::Validation("Invalid JSON".to_string())
    }
}
