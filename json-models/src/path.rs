//! Path resolution over a document tree.
//!
//! A [`FieldPath`] is a dotted path such as `kiddie.looks.head.hair`. [`resolve`] walks it
//! read-only: a missing intermediate object reads as an empty node, so every missing leaf
//! comes back as [`Lookup::Missing`] instead of an error. [`assign`] walks it for writing and
//! creates intermediate objects as needed. Either walk fails with
//! [`ModelError::MalformedDocument`] when it has to descend into a value that is not an object.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::ModelError;

/// Ordered child-key segments, fixed at declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Splits a dotted path. Validation of empty segments happens when a model type is declared.
    pub fn new(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the path has at least one segment and no segment is empty.
    pub fn is_well_formed(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(|s| !s.is_empty())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        FieldPath::new(dotted)
    }
}

/// Result of reading a leaf: keeps absent, explicit null and empty object apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Missing,
    Null,
    EmptyObject,
    Present(&'a Value),
}

impl<'a> Lookup<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        match value {
            None => Lookup::Missing,
            Some(Value::Null) => Lookup::Null,
            Some(Value::Object(map)) if map.is_empty() => Lookup::EmptyObject,
            Some(value) => Lookup::Present(value),
        }
    }

    /// Missing, null and `{}` all count as empty for default substitution.
    pub fn is_empty(&self) -> bool {
        !matches!(self, Lookup::Present(_))
    }

    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Lookup::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// Reads the leaf at `path`.
pub fn resolve<'a>(tree: &'a Map<String, Value>, path: &FieldPath) -> Result<Lookup<'a>, ModelError> {
    match path.segments() {
        [] => Err(ModelError::MalformedDocument("empty field path".to_string())),
        segments => resolve_segments(tree, segments, path),
    }
}

fn resolve_segments<'a>(
    tree: &'a Map<String, Value>,
    segments: &[String],
    path: &FieldPath,
) -> Result<Lookup<'a>, ModelError> {
    let (head, rest) = match segments.split_first() {
        Some(split) => split,
        None => return Ok(Lookup::Missing),
    };
    let child = tree.get(head);
    if rest.is_empty() {
        return Ok(Lookup::of(child));
    }
    match child {
        // Absent or null intermediates read as an empty node.
        None | Some(Value::Null) => Ok(Lookup::Missing),
        Some(Value::Object(map)) => resolve_segments(map, rest, path),
        Some(other) => Err(not_an_object(path, head, other)),
    }
}

/// Writes `value` at `path`, replacing any existing leaf.
pub fn assign(tree: &mut Map<String, Value>, path: &FieldPath, value: Value) -> Result<(), ModelError> {
    match path.segments() {
        [] => Err(ModelError::MalformedDocument("empty field path".to_string())),
        segments => assign_segments(tree, segments, path, value),
    }
}

fn assign_segments(
    tree: &mut Map<String, Value>,
    segments: &[String],
    path: &FieldPath,
    value: Value,
) -> Result<(), ModelError> {
    let (head, rest) = match segments.split_first() {
        Some(split) => split,
        None => return Ok(()),
    };
    if rest.is_empty() {
        tree.insert(head.clone(), value);
        return Ok(());
    }
    let child = tree
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if child.is_null() {
        *child = Value::Object(Map::new());
    }
    match child {
        Value::Object(map) => assign_segments(map, rest, path, value),
        other => Err(not_an_object(path, head, other)),
    }
}

fn not_an_object(path: &FieldPath, segment: &str, found: &Value) -> ModelError {
    let kind = match found {
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Null | Value::Object(_) => "a non-object",
    };
    ModelError::MalformedDocument(format!(
        "cannot descend through `{}` on path `{}`: found {}",
        segment, path, kind
    ))
}
