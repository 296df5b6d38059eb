//! Authorization gate applied between routing and invocation.

use crate::registry::HandlerSpec;
use crate::transport::Request;

/// Decides whether a request may invoke the resolved handler.
///
/// The gate runs after path resolution but before body decoding and argument
/// binding, so a rejected request never reaches handler code. Implementations
/// typically inspect `request.identity`.
pub trait AuthorizationGate: Send + Sync {
    fn is_authorized(&self, request: &Request, handler: &HandlerSpec) -> bool;
}

/// Default gate: every request is authorized.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AuthorizationGate for AllowAll {
    fn is_authorized(&self, _request: &Request, _handler: &HandlerSpec) -> bool {
        true
    }
}
