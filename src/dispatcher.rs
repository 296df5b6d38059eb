//! Request dispatch: resolve, select, authorize, decode, bind, invoke,
//! translate.
//!
//! The dispatcher owns the compiled [`ResourceTree`] and runs every request
//! through the same pipeline. Failures before invocation map to 4xx statuses
//! with a plain-text explanation; handler failures translate through
//! [`HandlerError::status`]; panics are caught and reported as 500s. Once a
//! handler has streamed bytes through the sink the response is committed and
//! cannot be rewritten, so late failures surface as [`FatalError`].

use crate::codec::{BodyDecoder, JsonBodyDecoder, JsonResultEncoder, ResultEncoder};
use crate::coerce::coerce;
use crate::context::InvocationContext;
use crate::error::{DispatchError, FatalError, HandlerError};
use crate::params::ParameterBag;
use crate::registry::{HandlerSpec, ReturnKind};
use crate::router::ResourceTree;
use crate::security::{AllowAll, AuthorizationGate};
use crate::transport::{Reply, Request, Response, ResponseSink};
use http::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct Dispatcher {
    tree: ResourceTree,
    gate: Arc<dyn AuthorizationGate>,
    decoder: Arc<dyn BodyDecoder>,
    encoder: Arc<dyn ResultEncoder>,
}

impl Dispatcher {
    pub fn new(tree: ResourceTree) -> Self {
        Self {
            tree,
            gate: Arc::new(AllowAll),
            decoder: Arc::new(JsonBodyDecoder),
            encoder: Arc::new(JsonResultEncoder),
        }
    }

    pub fn with_gate(mut self, gate: Arc<dyn AuthorizationGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn BodyDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn ResultEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Runs one request through the pipeline.
    ///
    /// `Ok` carries either a buffered response to send or the marker that the
    /// handler already streamed one. `Err` means the handler failed after the
    /// response was committed; the connection can no longer be salvaged.
    pub fn dispatch(
        &self,
        request: &Request,
        bag: &ParameterBag,
        sink: &mut dyn ResponseSink,
    ) -> Result<Reply, FatalError> {
        let resolution = match self.tree.resolve(&request.method, &request.path) {
            Ok(resolution) => resolution,
            Err(err) => return Ok(reject(request, &err)),
        };

        let handler = match select_handler(resolution.handlers, bag) {
            Some(handler) => handler,
            None => return Ok(reject(request, &DispatchError::VerbNotSupported)),
        };

        if !self.gate.is_authorized(request, handler) {
            return Ok(reject(request, &DispatchError::NotAuthorized));
        }

        let body = match &handler.body_shape {
            Some(shape) => {
                match self
                    .decoder
                    .decode(request.content_type.as_deref(), &request.body, shape)
                {
                    Ok(value) => Some(value),
                    Err(err) => {
                        return Ok(reject(
                            request,
                            &DispatchError::UnsupportedBodyType(err.to_string()),
                        ))
                    }
                }
            }
            None => None,
        };

        let arguments = match bind_arguments(handler, bag) {
            Ok(arguments) => arguments,
            Err(err) => return Ok(reject(request, &err)),
        };

        let key_map = named_captures(handler, &resolution.captures);

        debug!(
            method = %request.method,
            path = %request.path,
            handler = %handler.name,
            "invoking handler"
        );

        let outcome = {
            let mut context =
                InvocationContext::begin(request, sink, resolution.captures, key_map, body);
            catch_unwind(AssertUnwindSafe(|| (handler.call)(&mut context, arguments)))
                .unwrap_or_else(|panic| {
                    error!(handler = %handler.name, "handler panicked");
                    Err(HandlerError::Internal(anyhow::anyhow!(
                        "handler panicked: {}",
                        panic_message(&panic)
                    )))
                })
        };

        match outcome {
            Err(err) => {
                if sink.committed() {
                    return Err(FatalError {
                        handler: handler.name.clone(),
                        message: err.to_string(),
                    });
                }
                let status = err.status();
                warn!(handler = %handler.name, %status, error = %err, "handler failed");
                if status.is_client_error() {
                    Ok(Reply::Response(Response::plain_text(status, &err.to_string())))
                } else {
                    // 500s carry no detail to the client.
                    Ok(Reply::Response(Response::status_only(status)))
                }
            }
            Ok(result) => {
                if sink.committed() {
                    return Ok(Reply::Committed);
                }
                match handler.return_kind {
                    ReturnKind::Void => {
                        Ok(Reply::Response(Response::status_only(StatusCode::NO_CONTENT)))
                    }
                    ReturnKind::Value => match result {
                        None | Some(Value::Null) => {
                            Ok(Reply::Response(Response::status_only(StatusCode::NOT_FOUND)))
                        }
                        Some(value) => match self.encoder.encode(&value) {
                            Ok((content_type, bytes)) => Ok(Reply::Response(
                                Response::with_content(StatusCode::OK, content_type, bytes),
                            )),
                            Err(err) => {
                                error!(handler = %handler.name, error = %err, "result encoding failed");
                                Ok(Reply::Response(Response::status_only(
                                    StatusCode::INTERNAL_SERVER_ERROR,
                                )))
                            }
                        },
                    },
                }
            }
        }
    }
}

fn reject(request: &Request, err: &DispatchError) -> Reply {
    let status = err.status();
    debug!(method = %request.method, path = %request.path, %status, error = %err, "request rejected");
    Reply::Response(Response::plain_text(status, &err.to_string()))
}

/// Picks the overload whose formal parameters best cover the supplied names.
///
/// With `n` distinct supplied names, an overload with `f` formals and `m`
/// formals missing from the bag is viable iff `f >= n` and `f - m == n`: the
/// supplied names account for exactly the formals that are present. Among
/// viable overloads the one with the fewest missing formals wins; ties go to
/// the first registered.
fn select_handler<'a>(
    handlers: &'a [Arc<HandlerSpec>],
    bag: &ParameterBag,
) -> Option<&'a Arc<HandlerSpec>> {
    let n = bag.distinct_names();
    let mut best: Option<(&'a Arc<HandlerSpec>, usize)> = None;

    for handler in handlers {
        let formals = handler.parameters.len();
        if formals < n {
            continue;
        }

        let missing = handler
            .parameters
            .iter()
            .filter(|parameter| !bag.contains(&parameter.name))
            .count();
        if formals - missing != n {
            continue;
        }

        match best {
            Some((_, fewest)) if missing >= fewest => {}
            _ => best = Some((handler, missing)),
        }
    }

    best.map(|(handler, _)| handler)
}

/// Coerces the bag into positional arguments in declaration order.
///
/// List-shaped formals consume every raw value supplied under the name;
/// scalar formals take the last one. Absent formals coerce from nothing,
/// which yields the shape's default.
fn bind_arguments(
    handler: &HandlerSpec,
    bag: &ParameterBag,
) -> Result<Vec<Value>, DispatchError> {
    let mut arguments = Vec::with_capacity(handler.parameters.len());

    for parameter in &handler.parameters {
        let bound = if let crate::coerce::Shape::List(element) = &parameter.shape {
            let items = bag
                .all(&parameter.name)
                .iter()
                .map(|raw| coerce(Some(raw), element))
                .collect::<Result<Vec<_>, _>>();
            items.map(Value::Array)
        } else {
            coerce(bag.last(&parameter.name), &parameter.shape)
        };

        let value = bound.map_err(|source| DispatchError::InvalidParameter {
            name: parameter.name.clone(),
            source,
        })?;
        arguments.push(value);
    }

    Ok(arguments)
}

/// Pairs named capture keys with the capture values collected during
/// resolution; unnamed captures stay positional only.
fn named_captures(handler: &HandlerSpec, captures: &[String]) -> HashMap<String, String> {
    handler
        .keys
        .iter()
        .zip(captures)
        .filter_map(|(key, value)| key.as_ref().map(|name| (name.clone(), value.clone())))
        .collect()
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::Shape;
    use crate::registry::RouteSpec;
    use http::Method;
    use serde_json::json;

    fn spec(name: &str, formals: &[&str]) -> Arc<HandlerSpec> {
        let route = formals.iter().fold(
            RouteSpec::new(Method::GET, "/x", name, |_, _| Ok(None)),
            |route, formal| route.param(formal, Shape::String),
        );
        Arc::new(HandlerSpec {
            name: route.handler_name,
            parameters: route.parameters,
            keys: Vec::new(),
            body_shape: None,
            return_kind: route.return_kind,
            call: route.handler,
        })
    }

    #[test]
    fn test_select_exact_match() {
        let handlers = vec![spec("one", &["q"]), spec("two", &["q", "limit"])];
        let bag = ParameterBag::from_query("q=a&limit=5");
        let selected = select_handler(&handlers, &bag).unwrap();
        assert_eq!(selected.name, "two");
    }

    #[test]
    fn test_select_prefers_fewest_missing() {
        let handlers = vec![spec("wide", &["q", "limit", "offset"]), spec("narrow", &["q"])];
        let bag = ParameterBag::from_query("q=a");
        let selected = select_handler(&handlers, &bag).unwrap();
        assert_eq!(selected.name, "narrow");
    }

    #[test]
    fn test_select_tie_goes_to_first_registered() {
        let handlers = vec![spec("first", &["a", "b"]), spec("second", &["a", "c"])];
        let bag = ParameterBag::from_query("a=1");
        let selected = select_handler(&handlers, &bag).unwrap();
        assert_eq!(selected.name, "first");
    }

    #[test]
    fn test_select_rejects_unknown_names() {
        let handlers = vec![spec("one", &["q"])];
        let bag = ParameterBag::from_query("nope=1");
        assert!(select_handler(&handlers, &bag).is_none());
    }

    #[test]
    fn test_bind_scalar_takes_last_value() {
        let handler = spec("one", &["q"]);
        let bag = ParameterBag::from_query("q=first&q=second");
        let arguments = bind_arguments(&handler, &bag).unwrap();
        assert_eq!(arguments, vec![json!("second")]);
    }

    #[test]
    fn test_named_captures_skip_unnamed_keys() {
        let mut handler = spec("one", &[]);
        Arc::get_mut(&mut handler).unwrap().keys =
            vec![Some("id".to_string()), None, Some("part".to_string())];
        let captures = vec!["42".to_string(), "x".to_string(), "7".to_string()];
        let map = named_captures(&handler, &captures);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("id").map(String::as_str), Some("42"));
        assert_eq!(map.get("part").map(String::as_str), Some("7"));
    }
}
