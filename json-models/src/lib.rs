//! # json-models
//!
//! Typed models over JSON documents, fetched from REST services through finder URL
//! templates. A model type declares fields bound to dotted paths into its backing document;
//! reads go through the path on every access and writes go straight back into the document.
//!
//! ## Design principles
//!
//! - **The document is the state**: an instance owns one [`Document`] and nothing else.
//!   Serializing an instance gives back its document in compact form.
//! - **Missing is not an error**: reading a field whose leaf is absent, `null` or `{}` yields
//!   its default (or `None`, or an empty collection). Reads fail only for malformed documents
//!   and leaves of the wrong type.
//! - **Finders by key set**: a query names fields and values; the finder registered for
//!   exactly that set of names supplies the URL.
//! - **Stubs by injection**: tests replace a type's queries with canned answers for the
//!   lifetime of a guard ([`Model::stub`]), with no network and no global patching.
//!
//! ## Features
//!
//! - **Fields**: [`CharField`], [`IntField`], [`FloatField`], [`BoolField`], [`DateField`] and
//!   [`Collection`] of scalars or nested models, with optional `order_by`.
//! - **Declaration**: [`json_model!`] generates the struct, typed accessors and the
//!   [`Model`] impl, and registers finders, default headers and a post-load validator.
//! - **Queries**: [`Manager::get`], [`Manager::filter`], [`Manager::filter_custom`];
//!   multi-record bodies are newline-separated JSON objects, read into a [`QuerySet`].
//! - **Transport**: the [`Transport`] trait with [`UreqTransport`] (configured from
//!   `json-models-config`) and [`MockTransport`].
//!
//! ## Main modules
//!
//! - [`path`]: [`FieldPath`], [`resolve`](path::resolve) and [`assign`](path::assign).
//! - [`document`]: [`Document`].
//! - [`field`]: [`Field`] and the descriptor kinds.
//! - [`model`]: [`Model`], [`ModelType`] and the registry builder.
//! - [`query`]: [`Manager`], [`QuerySet`], [`QueryParams`], [`FinderTable`].
//! - [`stub`]: [`Stub`], [`with_stub`].
//! - [`transport`]: [`Transport`], [`UreqTransport`], [`MockTransport`].

pub mod document;
pub mod error;
pub mod field;
pub mod model;
pub mod path;
pub mod query;
pub mod stub;
pub mod transport;

pub use document::Document;
pub use error::{DeclarationError, ModelError};
pub use field::{
    BoolField, CharField, Collection, DateField, Element, Field, FieldInfo, FloatField,
    IntField, Scalar, ScalarField,
};
pub use model::{FieldEntry, Model, ModelType, ModelTypeBuilder};
pub use path::{FieldPath, Lookup};
pub use query::{Finder, FinderTable, Manager, QueryParams, QuerySet};
pub use stub::{with_stub, Expectation, Stub, StubCall};
pub use transport::{HttpResponse, MockTransport, RecordedRequest, Transport, TransportError, UreqTransport};
