//! Route registration surface.
//!
//! Embedders describe each operation as a [`RouteSpec`]: verb, path pattern,
//! declared parameters, optional body shape, and the handler closure. The
//! resource tree compiles specs into [`HandlerSpec`]s at startup; nothing is
//! registered after that.

use crate::coerce::Shape;
use crate::context::InvocationContext;
use crate::error::HandlerError;
use http::Method;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What a handler returns: `Ok(None)` and `Ok(Some(Value::Null))` both read
/// as "no result" and translate to 404 for value-returning handlers.
pub type HandlerResult = Result<Option<Value>, HandlerError>;

pub type HandlerFn =
    Arc<dyn Fn(&mut InvocationContext<'_>, Vec<Value>) -> HandlerResult + Send + Sync>;

/// Whether the operation produces a value at all. Void operations translate
/// success to 204 regardless of what the closure returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Void,
    Value,
}

#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub shape: Shape,
}

/// One registered operation, before compilation into the resource tree.
pub struct RouteSpec {
    pub method: Method,
    pub path_pattern: String,
    pub handler_name: String,
    pub parameters: Vec<ParameterSpec>,
    pub body_shape: Option<Shape>,
    pub return_kind: ReturnKind,
    pub(crate) handler: HandlerFn,
}

impl RouteSpec {
    pub fn new<F>(method: Method, path_pattern: &str, handler_name: &str, handler: F) -> Self
    where
        F: Fn(&mut InvocationContext<'_>, Vec<Value>) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
            parameters: Vec::new(),
            body_shape: None,
            return_kind: ReturnKind::Value,
            handler: Arc::new(handler),
        }
    }

    /// Declares a formal parameter. Declaration order is the argument order
    /// the handler closure receives.
    pub fn param(mut self, name: &str, shape: Shape) -> Self {
        self.parameters.push(ParameterSpec {
            name: name.to_string(),
            shape,
        });
        self
    }

    /// Declares that the operation consumes a decoded request body.
    pub fn body(mut self, shape: Shape) -> Self {
        self.body_shape = Some(shape);
        self
    }

    pub fn returns_void(mut self) -> Self {
        self.return_kind = ReturnKind::Void;
        self
    }
}

impl fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSpec")
            .field("method", &self.method)
            .field("path_pattern", &self.path_pattern)
            .field("handler_name", &self.handler_name)
            .field("parameters", &self.parameters)
            .field("body_shape", &self.body_shape)
            .field("return_kind", &self.return_kind)
            .finish_non_exhaustive()
    }
}

/// Compiled form of a route, stored in the verb buckets of the tree.
///
/// `keys` mirrors the capture segments of the pattern in order; unnamed `{}`
/// captures hold `None` and are reachable by index only.
pub struct HandlerSpec {
    pub name: String,
    pub parameters: Vec<ParameterSpec>,
    pub keys: Vec<Option<String>>,
    pub body_shape: Option<Shape>,
    pub return_kind: ReturnKind,
    pub(crate) call: HandlerFn,
}

impl fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSpec")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("keys", &self.keys)
            .field("body_shape", &self.body_shape)
            .field("return_kind", &self.return_kind)
            .finish_non_exhaustive()
    }
}
