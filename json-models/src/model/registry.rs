//! Per-type registry: named field descriptors, finder table and default headers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::{DeclarationError, ModelError};
use crate::field::FieldInfo;
use crate::query::{Finder, FinderTable};

/// One declared field.
#[derive(Clone, Copy)]
pub struct FieldEntry {
    name: &'static str,
    descriptor: &'static dyn FieldInfo,
}

impl FieldEntry {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> &'static dyn FieldInfo {
        self.descriptor
    }
}

impl fmt::Debug for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEntry")
            .field("name", &self.name)
            .field("path", &self.descriptor.path().to_string())
            .finish()
    }
}

/// The declared shape of a model type. Built once per type and shared for the life of the
/// process.
#[derive(Debug)]
pub struct ModelType {
    name: &'static str,
    fields: Vec<FieldEntry>,
    finders: FinderTable,
    headers: BTreeMap<String, String>,
}

impl ModelType {
    pub fn builder(name: &'static str) -> ModelTypeBuilder {
        ModelTypeBuilder {
            name,
            fields: Vec::new(),
            finders: Vec::new(),
            headers: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Result<&'static dyn FieldInfo, ModelError> {
        self.fields
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.descriptor)
            .ok_or_else(|| ModelError::UnknownField {
                model: self.name,
                field: name.to_string(),
            })
    }

    pub fn finders(&self) -> &FinderTable {
        &self.finders
    }

    /// Headers sent with every request for this type.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Builds a document from values keyed by *field name*, writing each at its field's path.
    pub fn document_from_fields(&self, values: &Map<String, Value>) -> Result<Document, ModelError> {
        let mut document = Document::new();
        for (name, value) in values {
            self.field(name)?.load(&mut document, value.clone())?;
        }
        Ok(document)
    }
}

pub struct ModelTypeBuilder {
    name: &'static str,
    fields: Vec<FieldEntry>,
    finders: Vec<(Vec<String>, String)>,
    headers: BTreeMap<String, String>,
}

impl ModelTypeBuilder {
    pub fn field(mut self, name: &'static str, descriptor: &'static dyn FieldInfo) -> Self {
        self.fields.push(FieldEntry { name, descriptor });
        self
    }

    /// Registers a template for the key set `keys`; placeholders are filled in `keys` order.
    pub fn finder(mut self, keys: &[&str], template: impl Into<String>) -> Self {
        let keys = keys.iter().map(|k| k.to_string()).collect();
        self.finders.push((keys, template.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Result<ModelType, DeclarationError> {
        let mut names = BTreeSet::new();
        for entry in &self.fields {
            if !names.insert(entry.name) {
                return Err(DeclarationError::DuplicateField(entry.name.to_string()));
            }
            let path = entry.descriptor.path();
            if !path.is_well_formed() {
                return Err(DeclarationError::MalformedPath {
                    field: entry.name.to_string(),
                    path: path.to_string(),
                });
            }
        }
        let finders = self
            .finders
            .into_iter()
            .map(|(keys, template)| Finder::new(keys, template))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ModelType {
            name: self.name,
            fields: self.fields,
            finders: FinderTable::new(finders)?,
            headers: self.headers,
        })
    }
}
