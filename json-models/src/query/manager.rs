//! Per-type query manager: finder resolution, fetch and materialization.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use super::params::QueryParams;
use super::queryset::QuerySet;
use super::request::Request;
use crate::document::Document;
use crate::error::ModelError;
use crate::model::{Model, ModelType};
use crate::stub::{self, StubCall};
use crate::transport::{Transport, UreqTransport};

const APP_NAME: &str = "json-models";

/// The live transport shared by every manager built with [`Manager::new`].
///
/// Settings come from `env_config::load("json-models")`; if they cannot be loaded the
/// defaults are used.
pub fn default_transport() -> Arc<dyn Transport> {
    static TRANSPORT: OnceLock<Arc<dyn Transport>> = OnceLock::new();
    TRANSPORT
        .get_or_init(|| {
            let settings = match env_config::load(APP_NAME) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(error = %e, "failed to load client settings, using defaults");
                    env_config::ClientSettings::default()
                }
            };
            debug!(timeout = ?settings.timeout, user_agent = %settings.user_agent, "built transport");
            Arc::new(UreqTransport::from_settings(settings))
        })
        .clone()
}

/// Runs queries for model type `M`.
///
/// Every query first checks for a stub active on the current thread (see
/// [`Model::stub`]); only unstubbed queries reach the transport.
pub struct Manager<M> {
    model: &'static ModelType,
    transport: Arc<dyn Transport>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Manager<M> {
    pub fn new(model: &'static ModelType) -> Self {
        Self::with_transport(model, default_transport())
    }

    pub fn with_transport(model: &'static ModelType, transport: Arc<dyn Transport>) -> Self {
        Self {
            model,
            transport,
            _model: PhantomData,
        }
    }

    pub fn model_type(&self) -> &'static ModelType {
        self.model
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        self.model.headers()
    }

    /// The URL a `get` or `filter` with `params` would fetch. Nothing is sent.
    pub fn resolve(&self, params: impl Into<QueryParams>) -> Result<String, ModelError> {
        self.model.finders().resolve(self.model.name(), &params.into())
    }

    /// Exactly one instance.
    ///
    /// Fails with `NoRegisteredFinder` when no finder matches, `DoesNotExist` on an empty or
    /// non-2xx response, and with the model's validation error if the record is rejected.
    pub fn get(&self, params: impl Into<QueryParams>) -> Result<M, ModelError> {
        let params = params.into();
        if let Some(stub) = stub::active::<M>() {
            let call = StubCall::Get(params);
            let url = call.to_string();
            let mut records = stub.answer(call)?.into_iter();
            return match records.next() {
                Some(fields) => M::from_document(self.model.document_from_fields(&fields)?),
                None => Err(ModelError::DoesNotExist {
                    model: self.model.name(),
                    url,
                }),
            };
        }
        let url = self.model.finders().resolve(self.model.name(), &params)?;
        let document = self.fetch(url)?.into_single(self.model.name())?;
        M::from_document(document)
    }

    /// Zero or more instances from the finder matching `params`.
    pub fn filter(&self, params: impl Into<QueryParams>) -> Result<QuerySet<M>, ModelError> {
        let params = params.into();
        if let Some(stub) = stub::active::<M>() {
            return self.stubbed(&stub, StubCall::Filter(params));
        }
        let url = self.model.finders().resolve(self.model.name(), &params)?;
        self.filter_url(url)
    }

    /// Zero or more instances from `url`, bypassing the finder table.
    pub fn filter_custom(&self, url: impl Into<String>) -> Result<QuerySet<M>, ModelError> {
        let url = url.into();
        if let Some(stub) = stub::active::<M>() {
            return self.stubbed(&stub, StubCall::FilterCustom(url));
        }
        self.filter_url(url)
    }

    fn fetch(&self, url: String) -> Result<super::request::Fetched, ModelError> {
        Request {
            url,
            headers: self.model.headers(),
        }
        .send(self.model.name(), self.transport.as_ref())
    }

    fn filter_url(&self, url: String) -> Result<QuerySet<M>, ModelError> {
        let fetched = self.fetch(url.clone())?;
        let records = fetched.into_records(self.model.name())?;
        Ok(QuerySet::new(Some(url), self.headers().clone(), records))
    }

    fn stubbed(&self, stub: &stub::StubState, call: StubCall) -> Result<QuerySet<M>, ModelError> {
        let records = stub
            .answer(call)?
            .iter()
            .map(|fields| self.model.document_from_fields(fields))
            .collect::<Result<Vec<Document>, _>>()?;
        Ok(QuerySet::new(None, self.headers().clone(), records))
    }
}

impl<M> fmt::Debug for Manager<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("model", &self.model.name())
            .field("headers", self.model.headers())
            .finish()
    }
}
