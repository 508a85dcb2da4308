//! Model types: a document plus the declared fields read from it.
//!
//! Model types are normally declared with [`json_model!`](crate::json_model), which generates
//! the struct, one accessor per field and the [`Model`] impl. Instances own their
//! [`Document`] exclusively; field accessors read and write straight through it.

mod macros;
mod registry;

pub use registry::{FieldEntry, ModelType, ModelTypeBuilder};

use serde_json::Value;

use crate::document::Document;
use crate::error::ModelError;
use crate::query::Manager;
use crate::stub::Stub;

/// A declared model type.
pub trait Model: Sized + 'static {
    /// Field registry, finders and headers of this type.
    fn model_type() -> &'static ModelType;

    /// The process-wide query manager of this type.
    fn objects() -> &'static Manager<Self>;

    /// Wraps a document without running [`Model::validate_on_load`].
    #[doc(hidden)]
    fn from_document_unchecked(document: Document) -> Self;

    fn document(&self) -> &Document;

    fn document_mut(&mut self) -> &mut Document;

    /// Post-load hook, run once every time an instance is constructed.
    fn validate_on_load(&self) -> Result<(), ModelError> {
        Ok(())
    }

    /// Wraps an already-parsed document and validates it.
    fn from_document(document: Document) -> Result<Self, ModelError> {
        let model = Self::from_document_unchecked(document);
        model.validate_on_load()?;
        Ok(model)
    }

    /// Parses a serialized document. An empty string gives an empty document.
    fn parse(json: &str) -> Result<Self, ModelError> {
        Self::from_document(Document::parse(json)?)
    }

    fn from_value(value: Value) -> Result<Self, ModelError> {
        Self::from_document(Document::from_value(value)?)
    }

    /// An instance over `{}`.
    fn empty() -> Result<Self, ModelError> {
        Self::from_document(Document::new())
    }

    fn to_value(&self) -> Value {
        self.document().to_value()
    }

    /// Reads a field by declared name, in its stored JSON form (defaults applied).
    fn field_value(&self, name: &str) -> Result<Value, ModelError> {
        Self::model_type().field(name)?.sort_key(self.document())
    }

    /// Activates a stub for this type on the current thread until the guard is dropped.
    fn stub() -> Stub<Self> {
        Stub::activate()
    }
}
