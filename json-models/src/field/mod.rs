//! Field descriptors: typed, path-bound accessors over a [`Document`].
//!
//! A descriptor is declared once per model type and shared by every instance; it holds no
//! per-instance state. Reading goes through [`Field::parse`], writing through [`Field::save`]
//! followed by an assignment at the same path.
//!
//! | Descriptor        | Value                     | Stored as                  |
//! |-------------------|---------------------------|----------------------------|
//! | [`CharField`]     | `Option<String>`          | string                     |
//! | [`IntField`]      | `Option<i64>`             | integer                    |
//! | [`FloatField`]    | `Option<f64>`             | number                     |
//! | [`BoolField`]     | `Option<bool>`            | boolean                    |
//! | [`DateField`]     | `Option<NaiveDateTime>`   | epoch milliseconds         |
//! | [`Collection<E>`] | `Vec<E>`                  | array (scalars or objects) |

mod collection;
mod date;
mod scalar;

pub use collection::{compare_values, Collection, Element};
pub use date::DateField;
pub use scalar::{BoolField, CharField, FloatField, IntField, Scalar, ScalarField};

use serde_json::Value;

use crate::document::Document;
use crate::error::ModelError;
use crate::path::FieldPath;

/// A typed accessor bound to one path.
pub trait Field: Send + Sync + 'static {
    /// What a read produces and a write accepts.
    type Value;

    fn path(&self) -> &FieldPath;

    /// Reads the value, substituting the declared default when the leaf is missing, null or `{}`.
    ///
    /// Fails only for malformed documents or leaves of the wrong type.
    fn parse(&self, document: &Document) -> Result<Self::Value, ModelError>;

    /// Converts a value to its stored JSON form.
    fn save(&self, value: Self::Value) -> Value;

    /// `save` followed by an assignment at this field's path.
    fn store(&self, document: &mut Document, value: Self::Value) -> Result<(), ModelError> {
        let stored = self.save(value);
        document.assign(self.path(), stored)
    }
}

/// Type-erased view of a field, as kept in a model type's registry.
pub trait FieldInfo: Send + Sync {
    fn path(&self) -> &FieldPath;

    /// Parsed (defaulted) value in stored form, used as a sort key by ordered collections.
    fn sort_key(&self, document: &Document) -> Result<Value, ModelError>;

    /// Writes a raw value at this field's path, then reads it back so a leaf of the wrong
    /// type is rejected here rather than on a later read.
    fn load(&self, document: &mut Document, value: Value) -> Result<(), ModelError>;
}

impl<F: Field> FieldInfo for F {
    fn path(&self) -> &FieldPath {
        Field::path(self)
    }

    fn sort_key(&self, document: &Document) -> Result<Value, ModelError> {
        let value = self.parse(document)?;
        Ok(self.save(value))
    }

    fn load(&self, document: &mut Document, value: Value) -> Result<(), ModelError> {
        document.assign(Field::path(self), value)?;
        self.parse(document).map(drop)
    }
}
