//! Shared data shapes.
//!
//! Request parameters are JSON objects validated against per-endpoint
//! schemas. Responses are passed back as decoded JSON; only the pooled
//! calls add structure, pairing each input id with its own outcome.

use serde_json::{Map, Value};

use crate::error::ApiError;

/// A request parameter bag.
pub type Params = Map<String, Value>;

/// One entry of a pooled batch: the input id and what the server said about it.
#[derive(Debug)]
pub struct PoolOutcome {
    pub id: String,
    pub result: Result<Value, ApiError>,
}

impl PoolOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Remove `key` from `params` and return it as a single-entry bag.
pub(crate) fn split_off(params: &mut Params, key: &str) -> Params {
    let mut taken = Params::new();
    if let Some(value) = params.remove(key) {
        taken.insert(key.to_string(), value);
    }
    taken
}

/// Convert a JSON literal into a `Params` bag. Non-objects yield an empty bag.
pub fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}
