//! Raw request parameters, prior to coercion.
//!
//! Query strings and form bodies both decode into a [`ParameterBag`]: a
//! multimap from parameter name to every raw value supplied under that name,
//! in arrival order. Binding decides later whether a parameter consumes all
//! values (list shapes) or only the last one (scalars).

use serde_json::Value;
use std::collections::HashMap;
use url::form_urlencoded;

#[derive(Debug, Default, Clone)]
pub struct ParameterBag {
    values: HashMap<String, Vec<Value>>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a query string. A leading `?` is tolerated; repeated names
    /// accumulate in order.
    pub fn from_query(query: &str) -> Self {
        let mut bag = Self::new();
        for (name, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            bag.append_text(&name, &value);
        }
        bag
    }

    /// Decodes an `application/x-www-form-urlencoded` body.
    pub fn from_form(body: &[u8]) -> Self {
        let mut bag = Self::new();
        for (name, value) in form_urlencoded::parse(body) {
            bag.append_text(&name, &value);
        }
        bag
    }

    pub fn append(&mut self, name: &str, value: Value) {
        self.values.entry(name.to_string()).or_default().push(value);
    }

    pub fn append_text(&mut self, name: &str, value: &str) {
        self.append(name, Value::String(value.to_string()));
    }

    /// Number of distinct parameter names, the `n` of overload selection.
    pub fn distinct_names(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Every raw value supplied under `name`, in arrival order.
    pub fn all(&self, name: &str) -> &[Value] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The last raw value supplied under `name`; later values shadow earlier
    /// ones for scalar binding.
    pub fn last(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(|values| values.last())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
