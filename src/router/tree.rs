use crate::error::{DispatchError, RegistrationError};
use crate::registry::{HandlerSpec, RouteSpec};
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct ResourceNode {
    children: HashMap<String, ResourceNode>,
    variable: Option<Box<ResourceNode>>,
    handlers: HashMap<Method, Vec<Arc<HandlerSpec>>>,
}

/// Immutable routing tree compiled from route specs at startup.
///
/// The tree is never mutated after `build`, so resolution needs no locking
/// and is safe to share across threads behind an `Arc`.
pub struct ResourceTree {
    root: ResourceNode,
}

/// Outcome of resolving a request path: the verb bucket of overloads plus the
/// capture values collected along the walk, in path order.
pub struct Resolution<'a> {
    pub handlers: &'a [Arc<HandlerSpec>],
    pub captures: Vec<String>,
}

impl ResourceTree {
    /// Compiles route specs into the tree.
    ///
    /// Capture segments are written `{name}` or `{}`; a node has at most one
    /// variable child, shared by every pattern that captures at that depth.
    /// Overloads registered for the same verb and pattern keep registration
    /// order, which is also the tie-break order during selection.
    pub fn build(routes: Vec<RouteSpec>) -> Result<Self, RegistrationError> {
        let mut root = ResourceNode::default();

        for route in routes {
            for parameter in &route.parameters {
                parameter.shape.validate().map_err(|reason| {
                    RegistrationError::InvalidShape {
                        name: parameter.name.clone(),
                        reason,
                    }
                })?;
            }
            if let Some(shape) = &route.body_shape {
                shape
                    .validate()
                    .map_err(|reason| RegistrationError::InvalidShape {
                        name: format!("{} body", route.handler_name),
                        reason,
                    })?;
            }

            let mut keys: Vec<Option<String>> = Vec::new();
            let mut node = &mut root;

            for segment in route.path_pattern.split('/').filter(|s| !s.is_empty()) {
                if let Some(key) = capture_name(segment) {
                    if let Some(name) = &key {
                        let duplicate = keys.iter().flatten().any(|existing| existing == name);
                        if duplicate {
                            return Err(RegistrationError::DuplicateKey {
                                pattern: route.path_pattern.clone(),
                                key: name.clone(),
                            });
                        }
                    }
                    keys.push(key);
                    node = node.variable.get_or_insert_with(Box::default).as_mut();
                } else {
                    node = node.children.entry(segment.to_string()).or_default();
                }
            }

            debug!(
                method = %route.method,
                pattern = %route.path_pattern,
                handler = %route.handler_name,
                "registered route"
            );

            node.handlers
                .entry(route.method.clone())
                .or_default()
                .push(Arc::new(HandlerSpec {
                    name: route.handler_name,
                    parameters: route.parameters,
                    keys,
                    body_shape: route.body_shape,
                    return_kind: route.return_kind,
                    call: route.handler,
                }));
        }

        Ok(Self { root })
    }

    /// Walks the path segment by segment. Literal children win over the
    /// variable child; variable steps record the segment text as a capture.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<Resolution<'_>, DispatchError> {
        let mut node = &self.root;
        let mut captures = Vec::new();

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if let Some(child) = node.children.get(segment) {
                node = child;
            } else if let Some(variable) = &node.variable {
                captures.push(segment.to_string());
                node = variable;
            } else {
                return Err(DispatchError::RouteNotFound);
            }
        }

        match node.handlers.get(method) {
            Some(handlers) if !handlers.is_empty() => Ok(Resolution {
                handlers: handlers.as_slice(),
                captures,
            }),
            _ => Err(DispatchError::VerbNotSupported),
        }
    }
}

/// `{name}` yields `Some(Some(name))`, bare `{}` yields `Some(None)`, and a
/// literal segment yields `None`.
fn capture_name(segment: &str) -> Option<Option<String>> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() {
        Some(None)
    } else {
        Some(Some(inner.to_string()))
    }
}
