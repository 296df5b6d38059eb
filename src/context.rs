//! Per-invocation state handed to handlers.
//!
//! A context is created by the dispatcher immediately before the handler runs
//! and torn down when it returns; its accessors expose the request snapshot,
//! the response sink, the path captures, and the decoded body. State never
//! leaks between invocations because the context owns it and clears it on
//! drop.

use crate::coerce::{coerce, CoerceError, Shape};
use crate::transport::{Request, ResponseSink};
use serde_json::Value;
use std::collections::HashMap;

pub struct InvocationContext<'a> {
    request: &'a Request,
    response: &'a mut dyn ResponseSink,
    key_list: Vec<String>,
    key_map: HashMap<String, String>,
    body: Option<Value>,
}

impl<'a> InvocationContext<'a> {
    pub(crate) fn begin(
        request: &'a Request,
        response: &'a mut dyn ResponseSink,
        key_list: Vec<String>,
        key_map: HashMap<String, String>,
        body: Option<Value>,
    ) -> Self {
        Self {
            request,
            response,
            key_list,
            key_map,
            body,
        }
    }

    pub fn request(&self) -> &Request {
        self.request
    }

    pub fn response(&self) -> &dyn ResponseSink {
        &*self.response
    }

    /// Mutable sink access for handlers that stream the response themselves.
    /// Writing any bytes commits the response.
    pub fn response_mut(&mut self) -> &mut dyn ResponseSink {
        &mut *self.response
    }

    /// Path captures in path order, outermost first.
    pub fn keys(&self) -> &[String] {
        &self.key_list
    }

    pub fn key(&self, index: usize) -> Option<&str> {
        self.key_list.get(index).map(String::as_str)
    }

    pub fn named_key(&self, name: &str) -> Option<&str> {
        self.key_map.get(name).map(String::as_str)
    }

    /// Positional capture coerced to the given shape. A missing capture
    /// coerces like an absent value.
    pub fn key_as(&self, index: usize, shape: &Shape) -> Result<Value, CoerceError> {
        let raw = self.key(index).map(|text| Value::String(text.to_string()));
        coerce(raw.as_ref(), shape)
    }

    pub fn named_key_as(&self, name: &str, shape: &Shape) -> Result<Value, CoerceError> {
        let raw = self
            .named_key(name)
            .map(|text| Value::String(text.to_string()));
        coerce(raw.as_ref(), shape)
    }

    /// Decoded request body, if the operation declared one.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub(crate) fn end(&mut self) {
        self.key_list.clear();
        self.key_map.clear();
        self.body = None;
    }
}

impl Drop for InvocationContext<'_> {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::BufferSink;
    use http::Method;
    use serde_json::json;

    #[test]
    fn test_key_accessors() {
        let request = Request::new(Method::GET, "/items/42");
        let mut sink = BufferSink::new();
        let mut key_map = HashMap::new();
        key_map.insert("id".to_string(), "42".to_string());
        let ctx = InvocationContext::begin(
            &request,
            &mut sink,
            vec!["42".to_string()],
            key_map,
            None,
        );

        assert_eq!(ctx.key(0), Some("42"));
        assert_eq!(ctx.key(1), None);
        assert_eq!(ctx.named_key("id"), Some("42"));
        assert_eq!(ctx.named_key("missing"), None);
        assert_eq!(ctx.key_as(0, &Shape::Int).unwrap(), json!(42));
        assert_eq!(ctx.named_key_as("id", &Shape::Long).unwrap(), json!(42));
        assert!(ctx.body().is_none());
    }

    #[test]
    fn test_missing_key_coerces_as_absent() {
        let request = Request::new(Method::GET, "/items");
        let mut sink = BufferSink::new();
        let ctx =
            InvocationContext::begin(&request, &mut sink, Vec::new(), HashMap::new(), None);

        assert_eq!(ctx.key_as(0, &Shape::Int).unwrap(), json!(0));
        assert_eq!(
            ctx.named_key_as("id", &Shape::optional(Shape::Int)).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_end_clears_state() {
        let request = Request::new(Method::GET, "/items/42");
        let mut sink = BufferSink::new();
        let mut ctx = InvocationContext::begin(
            &request,
            &mut sink,
            vec!["42".to_string()],
            HashMap::new(),
            Some(json!({"a": 1})),
        );
        ctx.end();
        assert!(ctx.keys().is_empty());
        assert!(ctx.body().is_none());
    }
}
