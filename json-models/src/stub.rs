//! Test stubs for model managers.
//!
//! `M::stub()` returns a [`Stub`] guard. While it is alive, every `get`, `filter` and
//! `filter_custom` issued for `M` *on the current thread* is answered from the expectations
//! registered on the guard instead of the transport. Dropping the guard (normally or while
//! unwinding) removes exactly its own entry, so nested stubs stack and guards may be
//! dropped in any order.
//!
//! ```
//! use json_models::{json_model, CharField, Model};
//! use serde_json::json;
//!
//! json_model! {
//!     pub struct Muppet {
//!         name: CharField = CharField::new("kiddie.value"),
//!         kind: CharField = CharField::new("kiddie.type").with_default("frog"),
//!     }
//!     finders {
//!         (name) => "http://foo.com/muppets/%s",
//!     }
//! }
//!
//! let stub = Muppet::stub();
//! stub.get([("name", "Kermit")]).returns(json!({"name": "Kermit", "kind": "toad"}));
//!
//! let kermit = Muppet::objects().get([("name", "Kermit")]).unwrap();
//! assert_eq!(kermit.kind().unwrap().as_deref(), Some("toad"));
//! ```

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ModelError;
use crate::model::Model;
use crate::query::QueryParams;

thread_local! {
    static ACTIVE: RefCell<HashMap<TypeId, Vec<Rc<StubState>>>> = RefCell::new(HashMap::new());
}

/// A query seen by a stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubCall {
    Get(QueryParams),
    Filter(QueryParams),
    FilterCustom(String),
}

impl fmt::Display for StubCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StubCall::Get(params) => write!(f, "get({})", params),
            StubCall::Filter(params) => write!(f, "filter({})", params),
            StubCall::FilterCustom(url) => write!(f, "filter_custom({})", url),
        }
    }
}

enum Outcome {
    Returns(Value),
    Raises(ModelError),
}

/// Expectations and call log shared by a guard and the managers it intercepts.
pub(crate) struct StubState {
    model: &'static str,
    expectations: RefCell<Vec<(StubCall, Outcome)>>,
    calls: RefCell<Vec<StubCall>>,
}

impl StubState {
    fn new(model: &'static str) -> Self {
        Self {
            model,
            expectations: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Records `call` and replays the most recently registered matching outcome as raw
    /// records, each a map of field name to value.
    pub(crate) fn answer(&self, call: StubCall) -> Result<Vec<Map<String, Value>>, ModelError> {
        debug!(model = self.model, call = %call, "stubbed call");
        self.calls.borrow_mut().push(call.clone());
        let expectations = self.expectations.borrow();
        let outcome = expectations
            .iter()
            .rev()
            .find(|(expected, _)| *expected == call)
            .map(|(_, outcome)| outcome);
        match outcome {
            Some(Outcome::Returns(payload)) => records(payload),
            Some(Outcome::Raises(error)) => Err(error.clone()),
            None => Err(ModelError::UnexpectedCall {
                model: self.model,
                call: call.to_string(),
            }),
        }
    }
}

/// An object is one record, an array is several, `null` is none.
fn records(payload: &Value) -> Result<Vec<Map<String, Value>>, ModelError> {
    fn record(value: &Value) -> Result<Map<String, Value>, ModelError> {
        match value {
            Value::Object(fields) => Ok(fields.clone()),
            other => Err(ModelError::MalformedDocument(format!(
                "stubbed record must be an object of field values, found {}",
                other
            ))),
        }
    }

    match payload {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(record).collect(),
        other => record(other).map(|fields| vec![fields]),
    }
}

/// The innermost stub active for `M` on this thread, if any.
pub(crate) fn active<M: Model>() -> Option<Rc<StubState>> {
    ACTIVE.with(|active| {
        active
            .borrow()
            .get(&TypeId::of::<M>())
            .and_then(|stack| stack.last())
            .cloned()
    })
}

/// Scope guard for a stubbed model type. Not `Send`: a stub belongs to the thread that
/// created it.
#[must_use = "the stub is removed as soon as the guard is dropped"]
pub struct Stub<M: Model> {
    state: Rc<StubState>,
    _model: PhantomData<M>,
}

impl<M: Model> Stub<M> {
    /// Installs a fresh stub for `M`, shadowing any stub already active on this thread.
    pub fn activate() -> Self {
        let model = M::model_type().name();
        let state = Rc::new(StubState::new(model));
        let depth = ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            let stack = active.entry(TypeId::of::<M>()).or_default();
            stack.push(Rc::clone(&state));
            stack.len()
        });
        debug!(model, depth, "stub activated");
        Self {
            state,
            _model: PhantomData,
        }
    }

    /// Expects `M::objects().get(params)`.
    pub fn get(&self, params: impl Into<QueryParams>) -> Expectation<'_> {
        self.expect(StubCall::Get(params.into()))
    }

    /// Expects `M::objects().filter(params)`.
    pub fn filter(&self, params: impl Into<QueryParams>) -> Expectation<'_> {
        self.expect(StubCall::Filter(params.into()))
    }

    /// Expects `M::objects().filter_custom(url)`.
    pub fn filter_custom(&self, url: impl Into<String>) -> Expectation<'_> {
        self.expect(StubCall::FilterCustom(url.into()))
    }

    /// Every call answered by this stub, matched or not, in order.
    pub fn calls(&self) -> Vec<StubCall> {
        self.state.calls.borrow().clone()
    }

    fn expect(&self, call: StubCall) -> Expectation<'_> {
        Expectation {
            state: &self.state,
            call,
        }
    }
}

impl<M: Model> Drop for Stub<M> {
    fn drop(&mut self) {
        let model = self.state.model;
        // `try_with`: the thread-local may already be gone when a guard outlives it.
        let _ = ACTIVE.try_with(|active| {
            let mut active = active.borrow_mut();
            let key = TypeId::of::<M>();
            if let Some(stack) = active.get_mut(&key) {
                stack.retain(|state| !Rc::ptr_eq(state, &self.state));
                if stack.is_empty() {
                    active.remove(&key);
                }
            }
        });
        debug!(model, "stub removed");
    }
}

/// A registered call shape waiting for its outcome.
#[must_use = "an expectation does nothing until `returns` or `raises` is called"]
pub struct Expectation<'a> {
    state: &'a StubState,
    call: StubCall,
}

impl Expectation<'_> {
    /// Answers the call with `payload`, keyed by field name: an object for one record, an
    /// array of objects for several.
    pub fn returns(self, payload: Value) {
        self.register(Outcome::Returns(payload));
    }

    /// Fails the call with `error`.
    pub fn raises(self, error: impl Into<ModelError>) {
        self.register(Outcome::Raises(error.into()));
    }

    fn register(self, outcome: Outcome) {
        self.state
            .expectations
            .borrow_mut()
            .push((self.call, outcome));
    }
}

/// Runs `f` with `M` stubbed, restoring the previous state afterwards even if `f` panics.
pub fn with_stub<M, F, R>(f: F) -> R
where
    M: Model,
    F: FnOnce(&Stub<M>) -> R,
{
    let stub = Stub::<M>::activate();
    f(&stub)
}
