use crate::coerce::CoerceError;
use http::StatusCode;
use thiserror::Error;

/// Failures detected by the dispatcher before a handler is ever invoked.
///
/// Routing and binding problems are translated into these variants inside
/// [`crate::dispatcher::Dispatcher::dispatch`]; the handler never runs and no
/// invocation context is created.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No literal or variable child matched some path segment.
    #[error("no resource matches the request path")]
    RouteNotFound,
    /// The path matched but the verb bucket is empty, or no registered
    /// overload accepts the supplied parameter set.
    #[error("no handler accepts the request method or parameter set")]
    VerbNotSupported,
    /// The authorization gate rejected the request for the resolved handler.
    #[error("not authorized")]
    NotAuthorized,
    /// The handler declares a body but the content could not be decoded.
    #[error("unsupported request body: {0}")]
    UnsupportedBodyType(String),
    /// A supplied parameter value could not be coerced to its declared shape.
    #[error("invalid value for parameter `{name}`: {source}")]
    InvalidParameter {
        name: String,
        #[source]
        source: CoerceError,
    },
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::RouteNotFound => StatusCode::NOT_FOUND,
            DispatchError::VerbNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::NotAuthorized => StatusCode::FORBIDDEN,
            DispatchError::UnsupportedBodyType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            DispatchError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// Failures raised by handler code, classified for status translation.
///
/// Handlers signal domain conditions through these variants; anything opaque
/// goes through [`HandlerError::Internal`] and maps to a 500 with no detail
/// exposed to the client.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    UnsupportedOperation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Lets handlers use `?` on context coercion results; a value the handler
/// itself could not coerce reads as an invalid argument.
impl From<CoerceError> for HandlerError {
    fn from(err: CoerceError) -> Self {
        HandlerError::InvalidArgument(err.to_string())
    }
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::InvalidArgument(_) | HandlerError::UnsupportedOperation(_) => {
                StatusCode::FORBIDDEN
            }
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::Conflict(_) => StatusCode::CONFLICT,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A handler failed after the response was committed.
///
/// The status line is already on the wire, so the failure cannot be rewritten
/// into a clean status code; the transport layer must treat the connection as
/// faulted.
#[derive(Debug, Error)]
#[error("handler `{handler}` failed after the response was committed: {message}")]
pub struct FatalError {
    pub handler: String,
    pub message: String,
}

/// Problems detected while building the resource tree at startup.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("duplicate capture name `{key}` in pattern `{pattern}`")]
    DuplicateKey { pattern: String, key: String },
    #[error("invalid shape for parameter `{name}`: {reason}")]
    InvalidShape { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_status() {
        assert_eq!(DispatchError::RouteNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            DispatchError::VerbNotSupported.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(DispatchError::NotAuthorized.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            DispatchError::UnsupportedBodyType("text/csv".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_handler_error_status() {
        assert_eq!(
            HandlerError::InvalidArgument("bad".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            HandlerError::UnsupportedOperation("nope".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            HandlerError::NotFound("missing".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HandlerError::Conflict("stale".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            HandlerError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
