//! Results of a multi-record query.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::slice;

use crate::document::Document;
use crate::error::ModelError;
use crate::model::Model;

/// Records returned by `filter` or `filter_custom`.
///
/// Holds the parsed documents; a model instance (and its validator) is built fresh on every
/// access, so iterating twice yields two independent sets of instances.
pub struct QuerySet<M> {
    url: Option<String>,
    headers: BTreeMap<String, String>,
    records: Vec<Document>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> QuerySet<M> {
    pub(crate) fn new(
        url: Option<String>,
        headers: BTreeMap<String, String>,
        records: Vec<Document>,
    ) -> Self {
        Self {
            url,
            headers,
            records,
            _model: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Same as [`len`](Self::len).
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Builds the instance at `index`.
    pub fn get(&self, index: usize) -> Option<Result<M, ModelError>> {
        self.records
            .get(index)
            .map(|document| M::from_document(document.clone()))
    }

    pub fn first(&self) -> Option<Result<M, ModelError>> {
        self.get(0)
    }

    /// Builds each record in turn. A rejected record fails the whole query: stop at the
    /// first `Err`, or use [`QuerySet::to_vec`], which does so.
    pub fn iter(&self) -> Iter<'_, M> {
        Iter {
            records: self.records.iter(),
            _model: PhantomData,
        }
    }

    /// Builds every instance; the first validation failure aborts the whole call.
    pub fn to_vec(&self) -> Result<Vec<M>, ModelError> {
        self.iter().collect()
    }

    /// URL the records came from; `None` for stubbed results.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Headers the request was sent with.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn records(&self) -> &[Document] {
        &self.records
    }
}

impl<M> fmt::Debug for QuerySet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySet")
            .field("url", &self.url)
            .field("records", &self.records.len())
            .finish()
    }
}

pub struct Iter<'a, M> {
    records: slice::Iter<'a, Document>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Iterator for Iter<'_, M> {
    type Item = Result<M, ModelError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records
            .next()
            .map(|document| M::from_document(document.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl<M: Model> ExactSizeIterator for Iter<'_, M> {}

impl<'a, M: Model> IntoIterator for &'a QuerySet<M> {
    type Item = Result<M, ModelError>;
    type IntoIter = Iter<'a, M>;

    fn into_iter(self) -> Iter<'a, M> {
        self.iter()
    }
}
