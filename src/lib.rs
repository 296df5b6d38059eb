//! Transport-agnostic HTTP-RPC dispatch: tree-based path routing, handler
//! overload resolution, and schema-driven argument coercion.
//!
//! The crate sits between an HTTP server and application handlers. The server
//! hands over a [`Request`] snapshot plus the raw query or form parameters;
//! the dispatcher resolves the path against a compiled resource tree, picks
//! the overload whose formal parameters match the supplied names, coerces raw
//! text into typed arguments, and invokes the handler with a scoped
//! [`InvocationContext`]. Failures at every stage translate into status
//! codes the embedding server can send as-is.
//!
//! # Architecture
//!
//! - [`router`] — the resource tree: literal segments plus one variable child
//!   per node for `{name}` / `{}` captures, resolved literal-first.
//! - [`registry`] — [`RouteSpec`] builders describing each operation and its
//!   declared parameter shapes.
//! - [`coerce`] — the shape table and the [`coerce`](coerce::coerce) /
//!   [`adapt`](coerce::adapt) conversions between wire values and
//!   [`serde_json::Value`].
//! - [`dispatcher`] — the pipeline: resolve, select, authorize, decode, bind,
//!   invoke, translate.
//! - [`context`] — per-invocation state (captures, decoded body, response
//!   sink), created before the handler runs and cleared after.
//! - [`params`] — the raw parameter multimap decoded from query strings and
//!   form bodies.
//! - [`codec`] / [`security`] / [`transport`] — pluggable seams for body
//!   decoding, result encoding, authorization, and the server boundary.
//!
//! # Quick start
//!
//! ```
//! use http::Method;
//! use rpcroute::{
//!     BufferSink, Dispatcher, ParameterBag, Request, ResourceTree, RouteSpec, Shape,
//! };
//! use serde_json::json;
//!
//! let routes = vec![RouteSpec::new(Method::GET, "/items/{id}", "get_item", |ctx, _args| {
//!     let id = ctx.named_key("id").unwrap_or("").to_string();
//!     Ok(Some(json!({ "id": id })))
//! })];
//!
//! let tree = ResourceTree::build(routes).unwrap();
//! let dispatcher = Dispatcher::new(tree);
//!
//! let request = Request::new(Method::GET, "/items/42");
//! let bag = ParameterBag::new();
//! let mut sink = BufferSink::new();
//!
//! let reply = dispatcher.dispatch(&request, &bag, &mut sink).unwrap();
//! let response = reply.into_response().unwrap();
//! assert_eq!(response.status, http::StatusCode::OK);
//! ```

pub mod codec;
pub mod coerce;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod params;
pub mod registry;
pub mod router;
pub mod security;
pub mod transport;

pub use codec::{BodyDecoder, BodyError, EncodeError, JsonBodyDecoder, JsonResultEncoder, ResultEncoder};
pub use coerce::{
    adapt, adapt_date, adapt_datetime, adapt_time, adapt_timestamp, coerce, AdaptError,
    CoerceError, EnumShape, FieldShape, RecordShape, Shape,
};
pub use context::InvocationContext;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, FatalError, HandlerError, RegistrationError};
pub use params::ParameterBag;
pub use registry::{HandlerResult, HandlerSpec, ParameterSpec, ReturnKind, RouteSpec};
pub use router::{Resolution, ResourceTree};
pub use security::{AllowAll, AuthorizationGate};
pub use transport::{BufferSink, Reply, Request, Response, ResponseSink};
